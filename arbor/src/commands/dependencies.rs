//! Commands that rewrite or inspect dependency declarations.

use anyhow::Result;
use indexmap::IndexMap;

use arbor_core::deps;
use arbor_core::{DependencyResolver, HoistOptions, HoistReport, Hoister};

use crate::formatting::{print_hoist_table, print_package_list, print_section_header, SectionStyle};
use crate::TargetArgs;

use super::{for_each_package, Action, Workspace};

const HOIST: Action = Action {
    title: "Hoisting dependencies",
    verb: "hoist",
    done: "Hoisted",
    progress: true,
};

const GENERATE: Action = Action {
    title: "Generating dependencies",
    verb: "generate dependencies for",
    done: "Generated dependencies for",
    progress: true,
};

pub fn cmd_hoist(mut ws: Workspace, targets: &TargetArgs, risky: bool) -> Result<()> {
    let hoister = Hoister::new(&ws.root, HoistOptions { risky });
    let mut reports: Vec<HoistReport> = Vec::new();

    let result = for_each_package(&mut ws, targets, &HOIST, |package| {
        reports.push(hoister.hoist(package)?);
        Ok(())
    });

    let changed: Vec<&HoistReport> = reports
        .iter()
        .filter(|r| !r.added.is_empty() || !r.updated.is_empty() || r.linked)
        .collect();
    if !ws.silent && !changed.is_empty() {
        println!();
        print_hoist_table(&changed);
    }

    result
}

pub fn cmd_deps_generate(mut ws: Workspace, targets: &TargetArgs) -> Result<()> {
    let parsers = arbor_adapters::default_parsers();
    let mut resolver = DependencyResolver::new(&ws.root, &parsers);
    let root = ws.root.clone();

    for_each_package(&mut ws, targets, &GENERATE, |package| {
        deps::generate(&root, &mut resolver, package).map(|_| ())
    })
}

/// Prints the external modules each targeted package imports.
///
/// Unlike the other per-package commands the first failure aborts, since a
/// partial listing is not useful output.
pub fn cmd_deps_list(mut ws: Workspace, targets: &TargetArgs, json: bool) -> Result<()> {
    let parsers = arbor_adapters::default_parsers();
    let mut resolver = DependencyResolver::new(&ws.root, &parsers);
    let names = ws.registry.resolve_targets(&targets.packages, &ws.cwd)?;

    let mut listing: IndexMap<String, Vec<String>> = IndexMap::new();
    for name in names {
        let package = ws.registry.get(&name)?;
        let imported = deps::list(&mut resolver, &package)?;
        listing.insert(name, imported);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for (name, imported) in &listing {
        print_section_header(name, SectionStyle::Secondary);
        print_package_list(imported);
        println!();
    }

    Ok(())
}
