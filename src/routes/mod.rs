/// Router Module Index
///
/// Routes are split by how the access gate treats them. The gate itself is applied once,
/// around the merged router, in `create_router`.

/// HTML pages. Guarded, apart from the PIN form itself.
pub mod site;

/// JSON endpoints under `/api`. Exempt.
pub mod api;
