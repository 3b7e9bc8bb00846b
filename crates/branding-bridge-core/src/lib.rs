//! Core abstractions for the branding bridge.
//!
//! This crate provides the fundamental building blocks:
//! - `CompositeDocument` - The snapshot exchanged with the editor UI
//! - `DEFAULT_THEME` - Fallback theme used when the tenant has none
//! - `merge` - Deep merge of localized text trees
//! - `Gateway` and `TextBundleSource` - Remote resource traits
//! - `TaskGroup` - Fan-out/fan-in with first-error cancellation
//! - `EditorConfig` - Session configuration

pub mod config;
pub mod document;
pub mod gateway;
pub mod group;
pub mod merge;
pub mod notice;
pub mod theme;

pub use config::{ConfigError, EditorConfig, TextSettings};
pub use document::{
    AuthenticationProfile, BrandingColors, BrandingFont, BrandingSettings, CompositeDocument,
    CustomTextMap, TenantInfo, TextTree, UniversalLoginTemplate,
};
pub use gateway::{CustomDomain, Gateway, GatewayError, TenantSettings, TextBundleSource};
pub use group::TaskGroup;
pub use merge::merge;
pub use notice::{Notice, SessionObserver, TracingObserver};
pub use theme::{DEFAULT_THEME, ThemeDescriptor};
