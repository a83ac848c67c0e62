//! Diagnostic sink for non-fatal cache problems (made by FontLab https://www.fontlab.com/)

use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Receives advisory messages: undecodable fonts, unreadable cache files and so on.
///
/// Without a callback, messages go to `tracing` at warn level.
#[derive(Clone, Default)]
pub struct Reporter {
    callback: Option<Rc<dyn Fn(&str)>>,
}

impl Reporter {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        Self {
            callback: Some(Rc::new(callback)),
        }
    }

    pub fn report(&self, message: &str) {
        match &self.callback {
            Some(callback) => callback(message),
            None => tracing::warn!(target: "fontcache", "{message}"),
        }
    }

    /// Scope messages to one font file (and sub-font, when nonzero).
    pub fn for_file<'a>(&'a self, path: &'a Path, index: u32) -> FileContext<'a> {
        FileContext {
            reporter: self,
            path,
            index,
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Prefixes every message with the file it concerns.
pub struct FileContext<'a> {
    reporter: &'a Reporter,
    path: &'a Path,
    index: u32,
}

impl FileContext<'_> {
    pub fn report(&self, message: &str) {
        let prefixed = if self.index == 0 {
            format!("{}: {message}", self.path.display())
        } else {
            format!("{}({}): {message}", self.path.display(), self.index)
        };
        self.reporter.report(&prefixed);
    }
}
