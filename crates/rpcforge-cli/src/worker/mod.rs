//! Orchestration of scanning, assembly and emission.

pub mod model;
pub mod rpc;
pub mod web;

use crate::{CliError, config::ScanConfig};
use rpcforge_analyse::{
    adapter::Diagnostics,
    assembler::Assembler,
    loader::load_dir,
    scanner::{ScanResult, Scanner},
};
use rpcforge_schema::{node::MetaData, validate::validate_metadata};
use std::path::Path;
use tracing::{info, warn};

///
/// Discovery
/// everything found below a declaration root
///

#[derive(Debug)]
pub struct Discovery {
    pub scan: ScanResult,
    pub metas: Vec<MetaData>,
    pub diagnostics: Diagnostics,
}

/// Load, scan and assemble the declarations under `root`.
pub fn discover(root: &Path, scan: &ScanConfig, need_impl: bool) -> Result<Discovery, CliError> {
    let (registry, report) = load_dir(root, &scan.suffix)?;
    info!(
        root = %root.display(),
        documents = report.loaded.len(),
        skipped = report.skipped.len(),
        modules = registry.len(),
        "declarations loaded"
    );

    let result = Scanner::new(&registry)
        .with_max_depth(scan.max_depth)
        .scan_all();
    for service in &result.services {
        info!(service = %service.class_ref(), "service class");
    }
    for implementation in &result.implementations {
        info!(implementation = %implementation.class_ref(), "implementation class");
    }

    let mut assembler = Assembler::new(need_impl);
    let metas = assembler.analyse(&result.services, &result.implementations)?;
    validate_metadata(&metas)?;

    let diagnostics = assembler.analyser().diagnostics();
    if diagnostics != Diagnostics::default() {
        warn!(
            void_fallbacks = diagnostics.void_fallbacks,
            void_list_elements = diagnostics.void_list_elements,
            "some declared types were not understood and adapted to void"
        );
    }

    Ok(Discovery {
        scan: result,
        metas,
        diagnostics,
    })
}
