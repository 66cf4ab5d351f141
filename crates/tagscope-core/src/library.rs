//! Registered tags and per-invocation resolution
//!
//! Turns a tag registration plus the attributes of one invocation into the
//! handler kind and descriptors the resolver needs, and attributes every failure
//! to the tag it came from.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, NameSource, TagConfig};
use crate::error::TranslationError;
use crate::handler::HandlerKind;
use crate::resolver::{PlanCache, SynchronizationPlan};
use crate::variable::VariableDescriptor;

/// Attribute values of one tag invocation, keyed by attribute name.
pub type Attributes = HashMap<String, String>;

/// Registered tags with a plan cache shared by every invocation.
///
/// Plans are keyed by the resolved descriptors, so tags whose variable names
/// come from attributes add one entry per distinct name. Entries live as long
/// as the library; hosts that plan unbounded attribute values call
/// [`TagLibrary::clear_cache`] between translation units.
#[derive(Debug)]
pub struct TagLibrary {
    config: Config,
    cache: PlanCache,
}

impl TagLibrary {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: PlanCache::new(),
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagConfig> {
        self.config.tags.iter()
    }

    pub fn get(&self, tag: &str) -> Option<&TagConfig> {
        self.config.tag(tag)
    }

    pub fn len(&self) -> usize {
        self.config.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.tags.is_empty()
    }

    /// Number of memoized plans.
    pub fn cached_plans(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Handler kind and scripting variables for one invocation of `tag`.
    pub fn resolve(
        &self,
        tag: &str,
        attributes: &Attributes,
    ) -> Result<(HandlerKind, Vec<VariableDescriptor>), TranslationError> {
        let registered = self.get(tag).ok_or_else(|| TranslationError::UnknownTag {
            tag: tag.to_string(),
        })?;

        let mut descriptors = Vec::with_capacity(registered.variables.len());
        for var in &registered.variables {
            let name = match var.name_source() {
                Some(NameSource::Given(name)) => name,
                Some(NameSource::FromAttribute(attribute)) => attributes
                    .get(attribute)
                    .map(String::as_str)
                    .ok_or_else(|| TranslationError::MissingAttribute {
                        tag: tag.to_string(),
                        attribute: attribute.to_string(),
                    })?,
                // Unvalidated registration; rejected below as an empty name.
                None => "",
            };

            let descriptor =
                VariableDescriptor::new(name, var.type_name.as_str(), var.declare, var.scope)
                    .map_err(|source| TranslationError::Scope {
                        tag: tag.to_string(),
                        source,
                    })?;
            descriptors.push(descriptor);
        }

        Ok((registered.kind, descriptors))
    }

    /// Synchronization plan for one invocation of `tag`. Plans are memoized.
    pub fn plan(
        &self,
        tag: &str,
        attributes: &Attributes,
    ) -> Result<Arc<SynchronizationPlan>, TranslationError> {
        let (kind, descriptors) = self.resolve(tag, attributes)?;
        debug!(tag, kind = %kind, variables = descriptors.len(), "planning tag invocation");

        self.cache
            .get_or_compute(&descriptors, kind)
            .map_err(|source| TranslationError::Scope {
                tag: tag.to_string(),
                source,
            })
    }
}

impl From<Config> for TagLibrary {
    fn from(config: Config) -> Self {
        TagLibrary::new(config)
    }
}
