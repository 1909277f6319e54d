use serde::Deserialize;

/// Trigger event used when none is configured.
pub const DEFAULT_TRIGGER_EVENT: &str = "click";

/// Options shared by [`ClickOutside::register`](crate::ClickOutside::register) and the
/// lifecycle wrapper.
///
/// Deserializes from `{ "triggerEvents": "click, keyup", "exclude": "#popup" }`; both keys
/// are optional.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClickOutsideOptions {
    trigger_events: Option<String>,
    exclude: Option<String>,
}

impl ClickOutsideOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the comma-separated list of event types to watch.
    #[must_use]
    pub fn with_trigger_events(mut self, events: impl Into<String>) -> Self {
        self.trigger_events = Some(events.into());
        self
    }

    /// Sets a CSS selector whose matches count as "inside".
    #[must_use]
    pub fn with_exclude(mut self, selector: impl Into<String>) -> Self {
        self.exclude = Some(selector.into());
        self
    }

    /// The event types to listen for, in configuration order.
    ///
    /// Splits on `,` and trims each entry; blank entries are skipped. Falls back to
    /// [`DEFAULT_TRIGGER_EVENT`] when nothing usable is configured. Registration and
    /// removal both go through this method, so they always agree.
    #[must_use]
    pub fn trigger_events(&self) -> Vec<String> {
        let events: Vec<String> = self
            .trigger_events
            .as_deref()
            .map(|raw| {
                raw.split(',').map(str::trim).filter(|e| !e.is_empty()).map(str::to_owned).collect()
            })
            .unwrap_or_default();

        if events.is_empty() { vec![DEFAULT_TRIGGER_EVENT.to_owned()] } else { events }
    }

    /// The exclusion selector, if one is set and not blank.
    #[must_use]
    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
