use std::borrow::Cow;

use log::debug;

use super::view::{View, ViewContext, ViewState};
use crate::config::{DEFAULT_BASE_PATH, RouterConfig, normalize_base_path};

/// Maps dashboard paths to view states and back.
///
/// `<base>/<view>[/<sub>][/<id>]`; the default view lives at `<base>` itself.
/// Segments are percent-encoded so opaque ids survive the trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCodec {
    base: String,
}

impl Default for PathCodec {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

impl PathCodec {
    pub fn new(base: &str) -> Self {
        Self {
            base: normalize_base_path(base),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(&config.base_path)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn root(&self) -> String {
        if self.base.is_empty() {
            "/".to_string()
        } else {
            self.base.clone()
        }
    }

    pub fn decode(&self, path: &str) -> ViewState {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let rest = self.strip_base(path);

        let segments: Vec<Cow<'_, str>> = rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode_segment)
            .collect();
        if segments.len() > 3 {
            debug!(
                "ignoring {} trailing segment(s) in {path}",
                segments.len() - 3
            );
        }

        let mut segments = segments.into_iter();
        let Some(view) = segments.next() else {
            return ViewState::default();
        };
        let context = segments.next().map(|sub| ViewContext {
            sub: sub.into_owned(),
            id: segments.next().map(Cow::into_owned),
        });
        ViewState::new(View::from_segment(&view), context)
    }

    pub fn encode(&self, state: &ViewState) -> String {
        if state.view.is_default() {
            return self.root();
        }
        let mut path = format!("{}/{}", self.base, encode_segment(state.view.as_str()));
        if let Some(context) = state.context.as_ref().filter(|ctx| !ctx.sub.is_empty()) {
            path.push('/');
            path.push_str(&encode_segment(&context.sub));
            if let Some(id) = context.id.as_deref().filter(|id| !id.is_empty()) {
                path.push('/');
                path.push_str(&encode_segment(id));
            }
        }
        path
    }

    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

fn encode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}
