//! Per-unit modules to the final module set

use crate::model::Module;

/// Assemble collected modules, optionally flattening nested modules.
pub fn assemble(modules: Vec<Module>, merge: bool) -> Vec<Module> {
    if merge {
        flatten(modules)
    } else {
        modules
    }
}

/// Flatten every nested module into one top-level list.
///
/// Pre-order over an explicit worklist, so deep namespace chains never grow
/// the call stack. Wrappers that only hold nested modules are dropped, and
/// modules sharing a name are coalesced into the first one seen.
pub fn flatten(modules: Vec<Module>) -> Vec<Module> {
    let mut out: Vec<Module> = Vec::new();
    let mut work: Vec<Module> = modules.into_iter().rev().collect();

    while let Some(mut module) = work.pop() {
        let nested = std::mem::take(&mut module.modules);
        work.extend(nested.into_iter().rev());

        if !module.has_declarations() && module.dependencies.is_empty() {
            continue;
        }
        match out.iter_mut().find(|m| m.name == module.name) {
            Some(existing) => {
                existing.classes.append(&mut module.classes);
                existing.interfaces.append(&mut module.interfaces);
                existing.enums.append(&mut module.enums);
                existing.dependencies.append(&mut module.dependencies);
            }
            None => out.push(module),
        }
    }

    tracing::debug!("Flattened into {} module(s)", out.len());
    out
}
