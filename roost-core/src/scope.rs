use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{Actor, Role};

/// Sentinel tenant id injected when an actor has no organisation and no
/// elevated role. It matches no persisted record, so the query returns an
/// empty result set instead of erroring (deny-by-default).
pub const DENIED_ORGANISATION: &str = "~no-organisation~";

/// A query about to be sent to the storage collaborator.
///
/// Known tenant/owner fields are typed; everything else the caller filters
/// on (the marketplace supports caller-defined listing and booking fields)
/// rides in the `filters` side-map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feduid: Option<String>,
    #[serde(flatten)]
    pub filters: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }
}

/// Tenant/role boundary derived for one request. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeContext {
    pub organisation_filter: Option<String>,
    pub owner_filter: Option<String>,
    pub allow_cross_tenant: bool,
}

/// A document about to be persisted that carries a tenant stamp.
pub trait OrgScoped {
    fn organisation_id(&self) -> Option<&str>;
    fn set_organisation_id(&mut self, organisation_id: Option<String>);
}

/// Rewrites queries and to-be-persisted documents so every read and write
/// stays inside the caller's authorized scope.
///
/// All functions here are total: an actor with no organisation and no
/// elevated role gets the [`DENIED_ORGANISATION`] filter, never an error.
pub struct ScopeFilter;

impl ScopeFilter {
    /// Derive the scope boundary for one request.
    ///
    /// `strict` asks a superadmin operation to honor a caller-supplied
    /// organisation filter instead of ignoring it.
    pub fn context_for(actor: &Actor, strict: bool) -> ScopeContext {
        if actor.is_role(Role::Superadmin) {
            return ScopeContext {
                organisation_filter: None,
                owner_filter: None,
                allow_cross_tenant: !strict,
            };
        }

        ScopeContext {
            organisation_filter: Some(Self::organisation_stamp(actor)),
            owner_filter: (!actor.is_elevated()).then(|| actor.id.clone()),
            allow_cross_tenant: false,
        }
    }

    /// Confine a read to the actor's tenant.
    ///
    /// A caller-supplied `organisationId` can never widen the scope: for a
    /// non-superadmin it is discarded and replaced with the actor's own
    /// organisation. A superadmin sees across tenants, except that under
    /// `strict` an explicitly supplied organisation filter is kept.
    pub fn apply_query_scope(actor: &Actor, query: &mut Query, strict: bool) {
        if actor.is_role(Role::Superadmin) {
            if !strict {
                query.organisation_id = None;
            }
            return;
        }

        query.organisation_id = Some(Self::organisation_stamp(actor));
        tracing::debug!(
            organisation = query.organisation_id.as_deref(),
            "query scoped to actor organisation"
        );
    }

    /// Narrow a self-scoped read ("list my bookings") to the caller's own
    /// records. Only `client` actors are narrowed; staff roles see the
    /// whole tenant.
    pub fn apply_self_scope(actor: &Actor, query: &mut Query) {
        if actor.is_role(Role::Client) {
            query.feduid = Some(actor.feduid.clone());
        }
    }

    /// Stamp the actor's organisation into a document being persisted,
    /// overwriting anything the caller supplied. A superadmin's document
    /// keeps whatever organisation it already carries.
    pub fn apply_save_scope(actor: &Actor, document: &mut dyn OrgScoped) {
        if actor.is_role(Role::Superadmin) {
            return;
        }

        document.set_organisation_id(Some(Self::organisation_stamp(actor)));
    }

    /// Owner check for owner-scoped operations (listing update/delete):
    /// the resource owner, or any admin/superadmin.
    pub fn can_modify(actor: &Actor, owner_id: &str) -> bool {
        actor.is_elevated() || actor.id == owner_id
    }

    fn organisation_stamp(actor: &Actor) -> String {
        actor
            .organisation_id
            .clone()
            .unwrap_or_else(|| DENIED_ORGANISATION.to_string())
    }
}
