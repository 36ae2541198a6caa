//! Binding services to implementations and producing sorted metadata.

use crate::{AnalyseError, analyser::Analyser, decl::ClassDecl};
use rpcforge_schema::node::MetaData;
use tracing::{debug, info};

///
/// Assembler
///

#[derive(Debug)]
pub struct Assembler {
    need_impl: bool,
    analyser: Analyser,
}

impl Assembler {
    #[must_use]
    pub fn new(need_impl: bool) -> Self {
        Self {
            need_impl,
            analyser: Analyser::new(),
        }
    }

    #[must_use]
    pub const fn analyser(&self) -> &Analyser {
        &self.analyser
    }

    /// One MetaData per service with at least one entry, sorted by
    /// lowercase name.
    pub fn analyse(
        &mut self,
        services: &[ClassDecl],
        implementations: &[ClassDecl],
    ) -> Result<Vec<MetaData>, AnalyseError> {
        let mut metas = Vec::new();

        for service in services {
            let entries = self.analyser.extract_methods(service)?;
            if entries.is_empty() {
                debug!(service = %service.name, "no entries; skipped");
                continue;
            }

            let impl_name = service.impl_name();
            let implementation = implementations.iter().find(|i| i.name == impl_name);
            if implementation.is_none() && self.need_impl {
                return Err(AnalyseError::MissingImpl {
                    service: service.name.clone(),
                });
            }

            info!(
                service = %service.name,
                entries = entries.len(),
                implementation = implementation.map(|i| i.name.as_str()),
                "service analysed"
            );

            metas.push(MetaData {
                name: service.name.clone(),
                service: service.class_ref(),
                entries,
                implementation: implementation.map(ClassDecl::class_ref),
                namespace: service.namespace.clone(),
            });
        }

        metas.sort_by_cached_key(|m| m.name.to_lowercase());

        Ok(metas)
    }
}

///
/// TESTS
///
