use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One top-level dashboard panel.
///
/// Unknown identifiers are kept verbatim in [`View::Other`]; deciding what to
/// render for them is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Chat,
    Tareas,
    Flujos,
    Entrenador,
    Informes,
    DashboardLive,
    Integraciones,
    MetaAds,
    Other(String),
}

impl View {
    pub const KNOWN: [View; 8] = [
        View::Chat,
        View::Tareas,
        View::Flujos,
        View::Entrenador,
        View::Informes,
        View::DashboardLive,
        View::Integraciones,
        View::MetaAds,
    ];

    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "chat" => Self::Chat,
            "tareas" => Self::Tareas,
            "flujos" => Self::Flujos,
            "entrenador" => Self::Entrenador,
            "informes" => Self::Informes,
            "dashboard-live" => Self::DashboardLive,
            "integraciones" => Self::Integraciones,
            "meta-ads" => Self::MetaAds,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Chat => "chat",
            Self::Tareas => "tareas",
            Self::Flujos => "flujos",
            Self::Entrenador => "entrenador",
            Self::Informes => "informes",
            Self::DashboardLive => "dashboard-live",
            Self::Integraciones => "integraciones",
            Self::MetaAds => "meta-ads",
            Self::Other(raw) => raw,
        }
    }

    /// The default panel, shown at the dashboard root.
    pub fn is_default(&self) -> bool {
        matches!(self.as_str(), "chat" | "")
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for View {
    fn from(value: &str) -> Self {
        Self::from_segment(value)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for View {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for View {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_segment(&raw))
    }
}

/// Sub-navigation nested under a view, e.g. `editor` + entity id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewContext {
    pub sub: String,
    #[serde(default)]
    pub id: Option<String>,
}

impl ViewContext {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            id: None,
        }
    }

    pub fn with_id(sub: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            id: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub view: View,
    #[serde(default)]
    pub context: Option<ViewContext>,
}

impl ViewState {
    /// Builds a state that encodes to a path and decodes back unchanged.
    ///
    /// `Other` views spelling a known identifier collapse onto it, the default
    /// view drops its context, an empty `sub` drops the context and an empty
    /// `id` becomes `None`.
    pub fn new(view: View, context: Option<ViewContext>) -> Self {
        let view = if view.is_default() {
            View::Chat
        } else {
            View::from_segment(view.as_str())
        };
        let context = match view {
            View::Chat => None,
            _ => context.and_then(|ctx| {
                if ctx.sub.is_empty() {
                    None
                } else {
                    Some(ViewContext {
                        sub: ctx.sub,
                        id: ctx.id.filter(|id| !id.is_empty()),
                    })
                }
            }),
        };
        Self { view, context }
    }

    pub fn is_default(&self) -> bool {
        self.view == View::Chat && self.context.is_none()
    }

    pub fn normalized(self) -> Self {
        Self::new(self.view, self.context)
    }
}
