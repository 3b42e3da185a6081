// Record selection: which declarations get reflection code.

use crate::domain::ast::{DeclKind, Declaration};

/// A record is a generation candidate when it is a concrete definition
/// carrying the reflect marker. Templates and forward declarations never are.
pub fn is_candidate(decl: &Declaration) -> bool {
    match decl.kind {
        DeclKind::Record {
            is_definition,
            is_template,
            ..
        } => !is_template && is_definition && decl.reflect_marker().is_some(),
        _ => false,
    }
}
