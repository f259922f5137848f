//! Rendering of fragments into a [`Context`].
//!
//! Rendering is split in two passes: [`Serialize::serialize_check`] walks the
//! tree and reports the first construct the dialect cannot render, and
//! [`Serialize::serialize`] writes SQL and is only called once the check passed.

use tessera_config::dialect::Feature;

use crate::{context::Context, error::Unsupported};

pub trait Serialize {
    /// Fails if the dialect of `ctx` cannot render this fragment or one of its children.
    fn serialize_check(&self, _ctx: &dyn Context) -> Result<(), Unsupported> {
        Ok(())
    }

    fn serialize(&self, ctx: &mut dyn Context);
}

/// Checks `fragment` against the dialect of `ctx`, then renders it.
pub fn serialize<T>(fragment: &T, ctx: &mut dyn Context) -> Result<(), Unsupported>
where
    T: Serialize + ?Sized,
{
    fragment.serialize_check(ctx)?;
    fragment.serialize(ctx);
    Ok(())
}

pub(crate) fn require(ctx: &dyn Context, feature: Feature) -> Result<(), Unsupported> {
    if ctx.supports(feature) {
        Ok(())
    } else {
        Err(Unsupported {
            dialect: ctx.dialect_name().to_string(),
            feature,
        })
    }
}

pub(crate) fn check_all<T: Serialize>(items: &[T], ctx: &dyn Context) -> Result<(), Unsupported> {
    items.iter().try_for_each(|item| item.serialize_check(ctx))
}

pub(crate) fn serialize_list<T: Serialize>(items: &[T], separator: &str, ctx: &mut dyn Context) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ctx.write(separator);
        }
        item.serialize(ctx);
    }
}
