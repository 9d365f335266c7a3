//! Adapter Routing
//!
//! A trie over identifier fragments mapping chain ids to adapter handles.
//! Routes are registered on a [`RouterBuilder`] during startup; `build`
//! freezes the tree into an [`AdapterRouter`] that is only read afterwards
//! and can be shared across tasks without locking.
//!
//! Resolution returns the most specific route, else the nearest ancestor
//! that was registered with wildcard support, else nothing:
//!
//! ```ignore
//! let mut builder = RouterBuilder::new();
//! builder.add_route("eip155", true, "evm")?;
//! builder.add_route("eip155:4", false, "rinkeby")?;
//! let router = builder.build();
//!
//! assert_eq!(router.get_adapter_handle("eip155:4"), Some(&"rinkeby"));
//! assert_eq!(router.get_adapter_handle("eip155:1"), Some(&"evm"));
//! assert_eq!(router.get_adapter_handle("cosmos:1"), None);
//! ```

use crate::identifier::fragment;
use crate::{GatewayError, Result};
use std::collections::BTreeMap;

/// A node of the routing trie.
#[derive(Clone, Debug)]
pub struct RouteNode<H> {
    routes: BTreeMap<String, RouteNode<H>>,
    adapter: Option<H>,
    wildcard: bool,
    is_root: bool,
}

impl<H> RouteNode<H> {
    fn root() -> Self {
        Self {
            routes: BTreeMap::new(),
            adapter: None,
            wildcard: false,
            is_root: true,
        }
    }

    fn intermediate() -> Self {
        Self {
            routes: BTreeMap::new(),
            adapter: None,
            wildcard: false,
            is_root: false,
        }
    }

    /// Adapter handle attached to this node, if any.
    pub fn adapter(&self) -> Option<&H> {
        self.adapter.as_ref()
    }

    /// Returns true if the node was registered with wildcard support.
    pub fn supports_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Returns true if the node answers for unmatched descendants.
    pub fn has_default_adapter(&self) -> bool {
        self.wildcard && self.adapter.is_some()
    }

    /// Returns true for the root of a tree.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Child nodes keyed by fragment.
    pub fn routes(&self) -> &BTreeMap<String, RouteNode<H>> {
        &self.routes
    }

    fn insert(&mut self, fragments: &[String], wildcard: bool, adapter: H) {
        let Some((head, rest)) = fragments.split_first() else {
            self.adapter = Some(adapter);
            self.wildcard = wildcard;
            return;
        };
        self.routes
            .entry(head.clone())
            .or_insert_with(Self::intermediate)
            .insert(rest, wildcard, adapter);
    }
}

/// Mutable route table used during startup.
#[derive(Clone, Debug)]
pub struct RouterBuilder<H> {
    root: RouteNode<H>,
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouterBuilder<H> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            root: RouteNode::root(),
        }
    }

    /// Register an adapter handle at a path such as `eip155` or `eip155:1`.
    ///
    /// Intermediate nodes are created on demand without wildcard support.
    /// Registering at an existing node replaces its handle and wildcard flag
    /// and keeps its children.
    pub fn add_route(&mut self, path: &str, wildcard: bool, adapter: H) -> Result<()> {
        let fragments = fragment(path);
        if fragments.iter().any(String::is_empty) {
            return Err(GatewayError::InvalidRoute {
                path: path.to_string(),
                reason: "route fragments cannot be empty".to_string(),
            });
        }
        self.root.insert(&fragments, wildcard, adapter);
        #[cfg(feature = "tracing")]
        tracing::debug!(path, wildcard, "registered route");
        Ok(())
    }

    /// Register several routes, stopping at the first invalid one.
    pub fn add_routes<I, P>(&mut self, routes: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, bool, H)>,
        P: AsRef<str>,
    {
        for (path, wildcard, adapter) in routes {
            self.add_route(path.as_ref(), wildcard, adapter)?;
        }
        Ok(())
    }

    /// Builder-style [`add_route`](Self::add_route).
    pub fn with_route(mut self, path: &str, wildcard: bool, adapter: H) -> Result<Self> {
        self.add_route(path, wildcard, adapter)?;
        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> AdapterRouter<H> {
        AdapterRouter { root: self.root }
    }
}

/// Read-only routing trie.
#[derive(Clone, Debug)]
pub struct AdapterRouter<H> {
    root: RouteNode<H>,
}

impl<H> AdapterRouter<H> {
    /// Start a new table.
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    /// Root node of the trie.
    pub fn root(&self) -> &RouteNode<H> {
        &self.root
    }

    /// Walk the trie and return the node answering for `path`.
    ///
    /// The walk stops at the first fragment without a child. The last
    /// matched node answers only if it has a wildcard default; an unmatched
    /// fragment directly under the root never resolves.
    pub fn get_router(&self, path: &str) -> Option<&RouteNode<H>> {
        let mut node = &self.root;
        for fragment in fragment(path) {
            match node.routes.get(&fragment) {
                Some(child) => node = child,
                None if !node.is_root && node.has_default_adapter() => return Some(node),
                None => return None,
            }
        }
        (!node.is_root).then_some(node)
    }

    /// Adapter handle for `path`, if any.
    pub fn get_adapter_handle(&self, path: &str) -> Option<&H> {
        self.get_router(path).and_then(RouteNode::adapter)
    }

    /// Adapter handle for `path`, or `RouteNotFound`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn resolve(&self, path: &str) -> Result<&H> {
        self.get_adapter_handle(path)
            .ok_or_else(|| GatewayError::RouteNotFound(path.to_string()))
    }

    /// Paths of all nodes carrying an adapter, with their wildcard flag.
    pub fn paths(&self) -> Vec<(String, bool)> {
        let mut paths = Vec::new();
        collect_paths(&self.root, &mut Vec::new(), &mut paths);
        paths
    }
}

fn collect_paths<H>(node: &RouteNode<H>, prefix: &mut Vec<String>, out: &mut Vec<(String, bool)>) {
    if node.adapter.is_some() {
        out.push((prefix.join(":"), node.wildcard));
    }
    for (fragment, child) in &node.routes {
        prefix.push(fragment.clone());
        collect_paths(child, prefix, out);
        prefix.pop();
    }
}
