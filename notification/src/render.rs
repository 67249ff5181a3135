//! Render-capability contract and the dispatcher that resolves it.

use crate::error::{Error, Result};
use crate::lifecycle::Countdown;
use crate::notification::{Key, Notification};
use log::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The `(target, function)` pair that identifies how a notification is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderCapability {
    target: Cow<'static, str>,
    function: Cow<'static, str>,
}

impl RenderCapability {
    pub const fn from_static(target: &'static str, function: &'static str) -> Self {
        Self {
            target: Cow::Borrowed(target),
            function: Cow::Borrowed(function),
        }
    }

    pub fn new(target: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            target: Cow::Owned(target.into()),
            function: Cow::Owned(function.into()),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl fmt::Display for RenderCapability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.function)
    }
}

/// Parses the `target.function` form used in configuration.
impl FromStr for RenderCapability {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.split_once('.') {
            Some((target, function)) if !target.is_empty() && !function.is_empty() => {
                Ok(Self::new(target, function))
            }
            _ => Err(Error::config(format!(
                "render capability must be written as `target.function`, got `{value}`"
            ))),
        }
    }
}

/// Everything a renderer is invoked with.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub key: &'a Key,
    /// `None` when rendering the disconnected slot, which is not a notification.
    pub notification: Option<&'a Notification>,
    /// Present while a dismiss countdown is running.
    pub countdown: Option<Countdown>,
}

/// Produces the inner markup of one notification.
pub trait Renderer: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&RenderContext<'_>) -> String + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        self(ctx)
    }
}

/// Registry of renderers keyed by render capability.
#[derive(Clone, Default)]
pub struct Dispatcher {
    renderers: HashMap<RenderCapability, Arc<dyn Renderer>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the renderer for `capability`.
    pub fn register(
        &mut self,
        capability: RenderCapability,
        renderer: impl Renderer + 'static,
    ) -> &mut Self {
        if self
            .renderers
            .insert(capability.clone(), Arc::new(renderer))
            .is_some()
        {
            warn!("Replaced renderer registered for {capability}");
        } else {
            debug!("Registered renderer for {capability}");
        }
        self
    }

    pub fn contains(&self, capability: &RenderCapability) -> bool {
        self.renderers.contains_key(capability)
    }

    /// Resolves the renderer for a capability.
    pub fn resolve_capability(&self, capability: &RenderCapability) -> Result<&dyn Renderer> {
        self.renderers
            .get(capability)
            .map(|renderer| renderer.as_ref())
            .ok_or_else(|| {
                Error::contract_violation(format!("no renderer registered for {capability}"))
            })
    }

    /// Resolves exactly one renderer for `notification`.
    pub fn resolve(&self, notification: &Notification) -> Result<&dyn Renderer> {
        let capability = notification.capability().ok_or_else(|| {
            Error::contract_violation(format!(
                "notification {} declares no render capability",
                notification.key()
            ))
        })?;
        self.resolve_capability(capability)
    }

    /// Resolves and invokes the renderer for `notification` once.
    pub fn dispatch(
        &self,
        notification: &Notification,
        countdown: Option<Countdown>,
    ) -> Result<String> {
        let renderer = self.resolve(notification)?;
        Ok(renderer.render(&RenderContext {
            key: notification.key(),
            notification: Some(notification),
            countdown,
        }))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("capabilities", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}
