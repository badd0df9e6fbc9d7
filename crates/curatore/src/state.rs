//! Application state shared across all handlers.
//!
//! The composition root: every component receives its collaborators here,
//! explicitly, through constructors. There is no ambient registry.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::access::{AccessPolicy, PgAccessPolicy};
use crate::config::Config;
use crate::db;
use crate::editor::CurationEditor;
use crate::lookup::{ContentLookup, PgContentLookup};
use crate::render::EmbedRenderer;
use crate::resolver::CurationResolver;
use crate::store::{CurationStore, PgCurationStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Membership storage.
    store: Arc<dyn CurationStore>,

    /// Host content lookup.
    lookup: Arc<dyn ContentLookup>,

    /// Host-delegated authorization.
    policy: Arc<dyn AccessPolicy>,

    /// Curation resolution.
    resolver: CurationResolver,

    /// Curation editing.
    editor: CurationEditor,

    /// Embed rendering and directive expansion.
    renderer: EmbedRenderer,
}

impl AppState {
    /// Create application state backed by PostgreSQL.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        let store = Arc::new(PgCurationStore::new(pool.clone()));
        let lookup = Arc::new(PgContentLookup::new(pool.clone(), config.site_url.clone()));
        let policy = Arc::new(PgAccessPolicy::new(pool));

        Ok(Self::with_components(store, lookup, policy))
    }

    /// Compose application state from explicit components.
    ///
    /// Embedders and tests use this to supply their own store, lookup, and
    /// policy implementations.
    pub fn with_components(
        store: Arc<dyn CurationStore>,
        lookup: Arc<dyn ContentLookup>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        let resolver = CurationResolver::new(store.clone(), lookup.clone());
        let editor = CurationEditor::new(store.clone(), policy.clone());
        let renderer = EmbedRenderer::new(resolver.clone(), lookup.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                lookup,
                policy,
                resolver,
                editor,
                renderer,
            }),
        }
    }

    /// Get the membership store.
    pub fn store(&self) -> &Arc<dyn CurationStore> {
        &self.inner.store
    }

    /// Get the content lookup.
    pub fn lookup(&self) -> &Arc<dyn ContentLookup> {
        &self.inner.lookup
    }

    /// Get the access policy.
    pub fn policy(&self) -> &Arc<dyn AccessPolicy> {
        &self.inner.policy
    }

    /// Get the curation resolver.
    pub fn resolver(&self) -> &CurationResolver {
        &self.inner.resolver
    }

    /// Get the curation editor.
    pub fn editor(&self) -> &CurationEditor {
        &self.inner.editor
    }

    /// Get the embed renderer.
    pub fn renderer(&self) -> &EmbedRenderer {
        &self.inner.renderer
    }
}
