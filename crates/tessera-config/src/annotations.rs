use documented::{Documented, DocumentedFields};
use toml_edit::{Decor, Item, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Turns `docs` into `# ` comment lines placed before whatever prefix `decor` already has.
pub fn prepend_doc_comments(decor: &mut Decor, docs: &str) {
    let mut comments: String = docs
        .lines()
        .map(|line| match line.trim_end() {
            "" => "#\n".to_string(),
            line => format!("# {line}\n"),
        })
        .collect();

    if let Some(existing) = decor.prefix().and_then(|p| p.as_str()) {
        let existing = existing.trim_start_matches('\n');
        if !existing.is_empty() {
            comments.push_str(existing);
        }
    }

    decor.set_prefix(comments);
}

/// Adds field documentation of `T` above every key of `table`.
///
/// Nested tables get the field docs on their header. With `with_container_docs`,
/// the docs of `T` itself are placed above the table header.
pub fn annotate_table<T>(table: &mut Table, with_container_docs: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if with_container_docs {
        prepend_doc_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let Ok(docs) = T::get_field_docs(key.get()) else {
            warn!(
                "No documentation for key '{}' in {}",
                key.get(),
                std::any::type_name::<T>()
            );
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(key.get().to_string())),
            Item::Value(_) => prepend_doc_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => prepend_doc_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    prepend_doc_comments(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}
