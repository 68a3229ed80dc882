//! Weblog add-in
//!
//! Publishes the active Markdown document to a weblog. The pieces:
//!
//! - `metadata` - post metadata kept in YAML front matter
//! - `config` - configured weblogs and `weblogs.json` persistence
//! - `metaweblog` - XML-RPC publishing
//! - `addin` - the add-in model used by the post composer
//! - `composer` - the post composer dialog's behavior

mod addin;
mod composer;
mod config;
mod metadata;
mod metaweblog;

pub use addin::{render_post_html, MarkdownWeblogAddin, PublishedPost, WeblogAddin};
pub use composer::{ComposerState, DocumentAccessor, HostWindow, PostComposer, PostOutcome};
pub use config::{
    WeblogApiType, WeblogConfiguration, WeblogInfo, WeblogStore, WEBLOG_CONFIG_FILE_NAME,
};
pub use metadata::{
    first_heading, markdown_body, parse_post_metadata, set_post_metadata, split_front_matter,
    WeblogPostMetadata,
};
pub use metaweblog::{MetaWeblogClient, PostPayload, WeblogPublisher, PUBLISH_TIMEOUT};

use log::info;
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::Result;

/// Everything the post composer works with: the add-in, its configuration
/// and where that configuration is stored.
pub struct WeblogService {
    ctx: Arc<AppContext>,
    pub config: WeblogConfiguration,
    store: WeblogStore,
    addin: Box<dyn WeblogAddin>,
}

impl WeblogService {
    pub fn new(ctx: Arc<AppContext>, store: WeblogStore, addin: Box<dyn WeblogAddin>) -> Self {
        let config = store.load();
        Self {
            ctx,
            config,
            store,
            addin,
        }
    }

    /// Service with the MetaWeblog add-in and `weblogs.json` in the config directory.
    pub fn with_defaults(ctx: Arc<AppContext>) -> Result<Self> {
        let addin = MarkdownWeblogAddin::new(Arc::clone(&ctx), Box::new(MetaWeblogClient::new()));
        Ok(Self::new(ctx, WeblogStore::in_config_dir()?, Box::new(addin)))
    }

    pub fn ctx(&self) -> &AppContext {
        &self.ctx
    }

    pub fn addin(&self) -> &dyn WeblogAddin {
        self.addin.as_ref()
    }

    pub fn store(&self) -> &WeblogStore {
        &self.store
    }

    /// Encrypt passwords and write the configuration.
    pub fn save_configuration(&mut self) -> Result<()> {
        self.config.encrypt_passwords(&self.ctx)?;
        self.store.save(&self.config)?;
        info!("Saved {} weblog(s)", self.config.weblogs.len());
        Ok(())
    }
}
