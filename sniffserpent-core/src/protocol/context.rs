//! State threaded between layers while a frame is decoded.

use smallvec::SmallVec;

use super::Layer;

/// A named number one layer leaves for the next, such as `("ethertype", 0x0800)`.
pub type HintEntry = (&'static str, u64);

/// Hints collected per layer. Rarely more than three.
pub type Hints = SmallVec<[HintEntry; 4]>;

/// What the decoder at the current position knows about the layers below it.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Capture link type, 1 for Ethernet.
    pub link_type: u16,
    /// Name of the layer decoded just before, `None` at the start of a frame.
    pub parent_protocol: Option<&'static str>,
    pub hints: Hints,
}

impl ParseContext {
    pub fn new(link_type: u16) -> Self {
        Self {
            link_type,
            parent_protocol: None,
            hints: Hints::new(),
        }
    }

    /// First value recorded under `key`.
    pub fn hint(&self, key: &str) -> Option<u64> {
        find_hint(&self.hints, key)
    }

    pub fn insert_hint(&mut self, key: &'static str, value: u64) {
        self.hints.push((key, value));
    }

    /// Like [`insert_hint`](Self::insert_hint) but replaces an existing value.
    pub fn set_hint(&mut self, key: &'static str, value: u64) {
        match self.hints.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.hints.push((key, value)),
        }
    }

    /// Whether `port` is the source or the destination port below us.
    pub fn has_port(&self, port: u16) -> bool {
        let port = Some(u64::from(port));
        self.hint("src_port") == port || self.hint("dst_port") == port
    }

    pub fn is_root(&self) -> bool {
        self.parent_protocol.is_none()
    }
}

fn find_hint(hints: &[HintEntry], key: &str) -> Option<u64> {
    hints
        .iter()
        .find_map(|&(k, v)| if k == key { Some(v) } else { None })
}

/// Outcome of one decoder run.
///
/// On failure `layer` is `None`, `error` says why and `remaining` is the
/// input the decoder was given, so the caller keeps it as payload.
#[derive(Debug, Clone)]
pub struct ParseResult<'data> {
    pub layer: Option<Layer>,
    /// Bytes after this layer's header.
    pub remaining: &'data [u8],
    /// Hints for choosing the next decoder.
    pub child_hints: Hints,
    pub error: Option<String>,
}

impl<'data> ParseResult<'data> {
    pub fn success(layer: Layer, remaining: &'data [u8], child_hints: Hints) -> Self {
        Self {
            layer: Some(layer),
            remaining,
            child_hints,
            error: None,
        }
    }

    pub fn error(error: String, remaining: &'data [u8]) -> Self {
        Self {
            layer: None,
            remaining,
            child_hints: Hints::new(),
            error: Some(error),
        }
    }

    pub fn hint(&self, key: &str) -> Option<u64> {
        find_hint(&self.child_hints, key)
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
