// --- File: crates/classnet_common/src/services.rs ---
//! Abstractions over the collaborators classnet consumes but does not own.
//!
//! Classroom, group and rule data is maintained by the administration
//! application; admin sessions are issued elsewhere too. The traits here are
//! the read-only seams the HTTP features depend on, so tests and small
//! deployments can plug in local implementations.

use std::future::Future;
use std::pin::Pin;

use crate::error::ClassnetError;
use crate::models::{AdminPrincipal, Classroom, RuleGroup};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Read access to classrooms and rule groups.
pub trait PolicyCatalog: Send + Sync {
    /// Look up a classroom by its internal id.
    fn classroom_by_id<'a>(&'a self, id: &'a str)
        -> BoxFuture<'a, Option<Classroom>, ClassnetError>;

    /// Look up a classroom by the name installers register with.
    /// Matching is case-insensitive.
    fn classroom_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Option<Classroom>, ClassnetError>;

    /// Look up a rule group by internal id.
    fn group_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Option<RuleGroup>, ClassnetError>;

    /// Look up a rule group by its public export name.
    fn group_by_export_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Option<RuleGroup>, ClassnetError>;
}

/// Resolves an administrative bearer credential to a principal.
pub trait AdminAuthenticator: Send + Sync {
    /// `Ok(None)` means the credential is not recognized.
    fn authenticate<'a>(
        &'a self,
        bearer: &'a str,
    ) -> BoxFuture<'a, Option<AdminPrincipal>, ClassnetError>;
}
