mod cache;
mod service;

use std::sync::{Arc, Mutex, PoisonError};

pub use cache::{CacheKey, MatchCache};
use log::{debug, error};
pub use service::{
    CheckResponse, CheckService, LanguageToolService, RawCategory, RawContext, RawMatch,
    RawReplacement, RawRule,
};

use crate::{
    config::ProofreadConfig, errors::ProofreadError, extract::FlatText, matches::Match,
    types::span::Span, utils::utf16::utf16_to_char_index,
};

/// Matches found in a window of the extracted text. Offsets are relative to
/// the whole `FlatText`, not just the window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fetched {
    /// The characters sent to the service.
    pub window: Span,
    /// The part of `window` the matches are final for. Where the window
    /// stops short of the text, the word at its edge is only there as
    /// context and falls outside.
    pub trusted: Span,
    pub matches: Vec<Match>,
}

/// Turns extracted text into matches by querying a `CheckService`, caching
/// results by fragment content. It never touches the document.
#[derive(Debug)]
pub struct SuggestionFetcher {
    service: Arc<dyn CheckService>,
    language: String,
    padding: usize,
    is_enabled: bool,
    cache: Mutex<MatchCache>,
}

impl SuggestionFetcher {
    #[must_use]
    pub fn new(config: &ProofreadConfig, service: Arc<dyn CheckService>) -> Self {
        Self {
            service,
            language: config.language.clone(),
            padding: config.fragment_padding,
            is_enabled: config.api_url.is_some(),
            cache: Mutex::new(MatchCache::new(config.cache_capacity)),
        }
    }

    /// Check the whole text.
    pub async fn fetch_full(&self, flat: &FlatText) -> Fetched {
        let whole = Span::new(0, flat.len());
        self.fetch_window(flat, whole, whole).await
    }

    /// Check the characters in `span` together with enough text around them
    /// for the service to see whole sentences. The window never splits a
    /// word, and matches touching a word it had to cut through are dropped.
    pub async fn fetch_fragment(&self, flat: &FlatText, span: Span) -> Fetched {
        let (window, trusted) = fragment_window(flat.text(), span, self.padding);
        let mut fetched = self.fetch_window(flat, window, trusted).await;

        fetched.matches.retain(|flagged| {
            let inside = trusted.from <= flagged.offset && flagged.end() <= trusted.to;
            if !inside {
                debug!(
                    "Dropping match {}..{} at the edge of the window",
                    flagged.offset,
                    flagged.end()
                );
            }

            inside
        });

        fetched
    }

    /// The number of cached fragments.
    #[must_use]
    pub fn cached_fragments(&self) -> usize { self.lock_cache().len() }

    async fn fetch_window(&self, flat: &FlatText, window: Span, trusted: Span) -> Fetched {
        let empty = Fetched {
            window,
            trusted,
            matches: Vec::new(),
        };

        if !self.is_enabled {
            debug!("No API URL is configured, skipping check");
            return empty;
        }

        let text = flat.slice(window);
        if text.trim().is_empty() {
            return empty;
        }

        let key = CacheKey::new(&text, window.from);
        let cached = self.lock_cache().get(&key).cloned();
        if let Some(matches) = cached {
            debug!("Cache hit for {} characters at {}", window.len(), window.from);
            return Fetched { matches, ..empty };
        }

        debug!("Cache miss for {} characters at {}", window.len(), window.from);

        let matches = match self.request(&text, window.from).await {
            Ok(matches) => matches,
            Err(error) => {
                error!("Checking service error: {error}");
                return empty;
            }
        };

        self.lock_cache().insert(key, matches.clone());

        Fetched { matches, ..empty }
    }

    async fn request(&self, text: &str, offset: usize) -> Result<Vec<Match>, ProofreadError> {
        let raw_matches = self.service.check(text, &self.language).await?;
        let length = text.chars().count();

        Ok(raw_matches
            .into_iter()
            .filter_map(|raw| match convert(text, raw) {
                Ok(converted) if converted.end() <= length => Some(converted.rebased(offset)),
                Ok(converted) => {
                    debug!(
                        "Dropping match {}..{} reaching past the fragment",
                        converted.offset,
                        converted.end()
                    );
                    None
                }
                Err(error) => {
                    debug!("Dropping match: {error}");
                    None
                }
            })
            .collect())
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, MatchCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pad `span` and widen it to whole words. Returns the window to check and
/// the part of it whose matches can be trusted: at an edge that stops short
/// of the text the outermost word is cut off from its sentence.
fn fragment_window(text: &str, span: Span, padding: usize) -> (Span, Span) {
    let chars: Vec<char> = text.chars().collect();
    let length = chars.len();
    let padded = span.padded(padding, length);
    let is_break = |index: &usize| chars[*index].is_whitespace();
    let splits_word =
        |index: usize| 0 < index && index < length && !is_break(&(index - 1)) && !is_break(&index);

    let from = if splits_word(padded.from) {
        (0..padded.from).rev().find(is_break).map_or(0, |index| index + 1)
    } else {
        padded.from
    };
    let to = if splits_word(padded.to) {
        (padded.to..length).find(is_break).unwrap_or(length)
    } else {
        padded.to
    };

    let trusted_from = if from == 0 {
        from
    } else {
        (from..to).find(is_break).unwrap_or(to)
    };
    let trusted_to = if to == length {
        to
    } else {
        (from..to).rev().find(is_break).map_or(from, |index| index + 1)
    };

    (
        Span::new(from, to),
        Span::new(trusted_from, trusted_to.max(trusted_from)),
    )
}

/// Convert a raw service match into a `Match` with character offsets into
/// `text`.
fn convert(text: &str, raw: RawMatch) -> Result<Match, ProofreadError> {
    let unmapped = || ProofreadError::Unmapped {
        offset: raw.offset,
        length: raw.length,
        text_length: text.encode_utf16().count(),
    };

    let raw_end = raw.offset.checked_add(raw.length).ok_or_else(unmapped)?;
    let start = utf16_to_char_index(text, raw.offset).ok_or_else(unmapped)?;
    let end = utf16_to_char_index(text, raw_end).ok_or_else(unmapped)?;

    Ok(Match {
        offset: start,
        length: end.checked_sub(start).ok_or_else(unmapped)?,
        rule_id: raw.rule.id,
        category_id: raw.rule.category.id,
        message: raw.message,
        replacements: raw
            .replacements
            .into_iter()
            .map(|replacement| replacement.value)
            .collect(),
        context_text: raw.context.text,
        context_offset: raw.context.offset,
        context_length: raw.context.length,
    })
}

#[cfg(test)]
pub(crate) mod test_service {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{CheckService, RawCategory, RawContext, RawMatch, RawRule};
    use crate::errors::ProofreadError;

    /// A scripted response: how long the request takes and what it returns.
    #[derive(Debug, Clone)]
    pub struct Reply {
        pub delay: Duration,
        pub result: Result<Vec<RawMatch>, u16>,
    }

    /// Records every request and replays scripted replies. Once the script
    /// runs out it flags every occurrence of `teh`.
    #[derive(Debug, Default, Clone)]
    pub struct ScriptedService {
        pub requests: Arc<Mutex<Vec<String>>>,
        pub replies: Arc<Mutex<VecDeque<Reply>>>,
    }

    impl ScriptedService {
        pub fn push_reply(&self, delay: Duration, result: Result<Vec<RawMatch>, u16>) {
            self.replies.lock().unwrap().push_back(Reply { delay, result });
        }

        pub fn requests(&self) -> Vec<String> { self.requests.lock().unwrap().clone() }
    }

    pub fn raw_match(offset: usize, length: usize, category_id: &str) -> RawMatch {
        RawMatch {
            offset,
            length,
            message: "Possible mistake found.".to_owned(),
            replacements: vec![super::RawReplacement {
                value: "the".to_owned(),
            }],
            rule: RawRule {
                id: format!("{category_id}_RULE"),
                category: RawCategory {
                    id: category_id.to_owned(),
                },
            },
            context: RawContext::default(),
        }
    }

    #[async_trait]
    impl CheckService for ScriptedService {
        async fn check(
            &self,
            text: &str,
            _language: &str,
        ) -> Result<Vec<RawMatch>, ProofreadError> {
            self.requests.lock().unwrap().push(text.to_owned());
            let reply = self.replies.lock().unwrap().pop_front();

            let Some(reply) = reply else {
                return Ok(text
                    .match_indices("teh")
                    .map(|(index, _)| {
                        let offset = text[..index].encode_utf16().count();
                        let mut found = raw_match(offset, 3, "TYPOS");
                        found.context = RawContext {
                            text: text.to_owned(),
                            offset,
                            length: 3,
                        };
                        found
                    })
                    .collect());
            };

            tokio::time::sleep(reply.delay).await;

            reply
                .result
                .map_err(|status| ProofreadError::ServiceStatus { status })
        }
    }
}
