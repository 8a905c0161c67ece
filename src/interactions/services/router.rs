//! Case-insensitive token-tree router with wildcard segments.
//!
//! A command is stored at a path of tokens. Lookup walks the tree token by
//! token, preferring exact keys over wildcard segments and backtracking
//! through wildcard segments in insertion order. Text matched by wildcard
//! markers is returned as captures, left to right.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

/// Errors returned while inserting routes.
#[derive(Debug, Clone, Error)]
pub enum RouterError {
    /// Another command already occupies the path.
    #[error("a command is already registered at '{0}'")]
    DuplicatePath(String),

    /// A wildcard segment could not be compiled.
    #[error("invalid wildcard segment '{segment}': {source}")]
    InvalidPattern {
        /// Offending segment.
        segment: String,
        /// Pattern compilation failure.
        source: regex::Error,
    },

    /// The path has no tokens.
    #[error("route path must not be empty")]
    EmptyPath,
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<T> {
    /// The routed command.
    pub command: Arc<T>,
    /// Text captured by wildcard segments, left to right.
    pub captures: Vec<String>,
}

impl<T> Clone for RouteMatch<T> {
    fn clone(&self) -> Self {
        Self {
            command: Arc::clone(&self.command),
            captures: self.captures.clone(),
        }
    }
}

/// Token tree mapping paths to commands.
#[derive(Debug)]
pub struct CommandRouter<T> {
    root: RouteNode<T>,
    delimiters: Vec<char>,
    wildcard: Option<String>,
    len: usize,
}

impl<T> CommandRouter<T> {
    /// Creates an empty router.
    ///
    /// Identifiers passed to [`CommandRouter::tokenize`] are split on
    /// `delimiters`; segments containing `wildcard` compile into capture
    /// patterns. An empty marker disables wildcards.
    #[must_use]
    pub fn new(delimiters: Vec<char>, wildcard: Option<String>) -> Self {
        Self {
            root: RouteNode::default(),
            delimiters,
            wildcard: wildcard.filter(|marker| !marker.is_empty()),
            len: 0,
        }
    }

    /// Returns the number of routed commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when no command is routed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Splits an identifier into tokens on the configured delimiters.
    #[must_use]
    pub fn tokenize(&self, identifier: &str) -> Vec<String> {
        if self.delimiters.is_empty() {
            return vec![identifier.to_owned()];
        }
        identifier
            .split(self.delimiters.as_slice())
            .map(str::to_owned)
            .collect()
    }

    /// Stores `command` at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::EmptyPath`] for an empty path,
    /// [`RouterError::DuplicatePath`] when the exact path (or an identical
    /// wildcard segment) is taken, and [`RouterError::InvalidPattern`] when a
    /// wildcard segment fails to compile.
    pub fn insert(&mut self, path: &[String], command: Arc<T>) -> Result<(), RouterError> {
        let (leaf, groups) = path.split_last().ok_or(RouterError::EmptyPath)?;
        let wildcard = self.wildcard.as_deref();

        let mut node = &mut self.root;
        for token in groups {
            node = node.child_mut(token, wildcard)?;
        }

        let duplicate = || RouterError::DuplicatePath(path.join(" "));
        match wildcard.filter(|marker| leaf.contains(marker)) {
            Some(marker) => {
                let segment = WildcardSegment::compile(leaf, marker)?;
                if node
                    .wildcard_commands
                    .iter()
                    .any(|(existing, _)| existing.source == segment.source)
                {
                    return Err(duplicate());
                }
                node.wildcard_commands.push((segment, command));
            }
            None => {
                let key = leaf.to_lowercase();
                if node.commands.contains_key(&key) {
                    return Err(duplicate());
                }
                node.commands.insert(key, command);
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Resolves a tokenized path.
    #[must_use]
    pub fn get<S: AsRef<str>>(&self, tokens: &[S]) -> Option<RouteMatch<T>> {
        let mut captures = Vec::new();
        let command = self.root.lookup(tokens, &mut captures)?;
        Some(RouteMatch { command, captures })
    }

    /// Tokenizes and resolves an opaque identifier.
    #[must_use]
    pub fn get_by_id(&self, identifier: &str) -> Option<RouteMatch<T>> {
        self.get(&self.tokenize(identifier))
    }
}

impl<T> Clone for CommandRouter<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            delimiters: self.delimiters.clone(),
            wildcard: self.wildcard.clone(),
            len: self.len,
        }
    }
}

#[derive(Debug, Clone)]
struct WildcardSegment {
    source: String,
    pattern: Regex,
}

impl WildcardSegment {
    /// Escapes literal text and turns every marker into a lazy capture.
    fn compile(segment: &str, marker: &str) -> Result<Self, RouterError> {
        let body = segment
            .split(marker)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("(.+?)");
        let pattern =
            Regex::new(&format!("(?i)^{body}$")).map_err(|source| RouterError::InvalidPattern {
                segment: segment.to_owned(),
                source,
            })?;
        Ok(Self {
            source: segment.to_lowercase(),
            pattern,
        })
    }

    fn captures(&self, token: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(token)?;
        Some(
            captures
                .iter()
                .skip(1)
                .flatten()
                .map(|capture| capture.as_str().to_owned())
                .collect(),
        )
    }
}

#[derive(Debug)]
struct RouteNode<T> {
    commands: HashMap<String, Arc<T>>,
    wildcard_commands: Vec<(WildcardSegment, Arc<T>)>,
    children: HashMap<String, RouteNode<T>>,
    wildcard_children: Vec<(WildcardSegment, RouteNode<T>)>,
}

impl<T> Default for RouteNode<T> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            wildcard_commands: Vec::new(),
            children: HashMap::new(),
            wildcard_children: Vec::new(),
        }
    }
}

impl<T> Clone for RouteNode<T> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            wildcard_commands: self.wildcard_commands.clone(),
            children: self.children.clone(),
            wildcard_children: self.wildcard_children.clone(),
        }
    }
}

impl<T> RouteNode<T> {
    fn child_mut(&mut self, token: &str, wildcard: Option<&str>) -> Result<&mut Self, RouterError> {
        if let Some(marker) = wildcard.filter(|marker| token.contains(marker)) {
            let segment = WildcardSegment::compile(token, marker)?;
            let position = self
                .wildcard_children
                .iter()
                .position(|(existing, _)| existing.source == segment.source);
            let index = position.unwrap_or_else(|| {
                self.wildcard_children.push((segment, Self::default()));
                self.wildcard_children.len() - 1
            });
            return self
                .wildcard_children
                .get_mut(index)
                .map(|(_, child)| child)
                .ok_or_else(|| RouterError::DuplicatePath(token.to_owned()));
        }
        Ok(self.children.entry(token.to_lowercase()).or_default())
    }

    fn lookup<S: AsRef<str>>(&self, tokens: &[S], captures: &mut Vec<String>) -> Option<Arc<T>> {
        let (first, rest) = tokens.split_first()?;
        let token = first.as_ref();
        let key = token.to_lowercase();

        if rest.is_empty() {
            if let Some(command) = self.commands.get(&key) {
                return Some(Arc::clone(command));
            }
            return self
                .wildcard_commands
                .iter()
                .find_map(|(segment, command)| {
                    segment.captures(token).map(|found| (found, command))
                })
                .map(|(found, command)| {
                    captures.extend(found);
                    Arc::clone(command)
                });
        }

        if let Some(command) = self
            .children
            .get(&key)
            .and_then(|child| child.lookup(rest, captures))
        {
            return Some(command);
        }

        for (segment, child) in &self.wildcard_children {
            let Some(found) = segment.captures(token) else {
                continue;
            };
            let mark = captures.len();
            captures.extend(found);
            if let Some(command) = child.lookup(rest, captures) {
                return Some(command);
            }
            captures.truncate(mark);
        }
        None
    }
}
