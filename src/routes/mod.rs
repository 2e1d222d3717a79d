mod health_check;
mod subscriptions;

pub use health_check::*;
pub use subscriptions::*;

/// Print an error and every `source` below it, one per line. Used for the
/// `Debug` impls of route errors, which is what `TracingLogger` records.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
