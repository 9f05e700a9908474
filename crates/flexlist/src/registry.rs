//! Type-to-policy registry.
//!
//! The registry answers "how is this item rendered?" for every item in an
//! adapter. Resolution goes through three tiers:
//!
//! 1. Self-describing items answer for themselves and are never cached.
//! 2. The item's concrete type is looked up by view-type tag. Explicit tags
//!    take precedence over implicit ones.
//! 3. Otherwise registrations are scanned in order and the first one whose
//!    matcher accepts the item wins. A kind-of match is cached against the
//!    concrete type and remembered as derived from the matched registration,
//!    so re-registering that type invalidates exactly those entries.
//!    Predicate matches are never cached; they share the registration's tag.
//!
//! The cache lives behind a lock so that lookups only need `&self`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use flexlist_core::logging::targets;

use crate::error::{Error, Result};
use crate::item::{FlexItem, TypeKey, ViewFactory};
use crate::policy::{LayoutId, RenderPolicy, Resolved, ViewType};

/// Type alias for a registration predicate.
pub type ItemMatcher<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// The outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    /// The key was not registered before.
    New,
    /// An earlier registration of the key was replaced. Items already in the
    /// collection should be re-scanned.
    Replaced,
}

enum Matcher<T> {
    KindOf,
    Predicate(ItemMatcher<T>),
}

struct Entry<T: FlexItem> {
    key: TypeKey,
    matcher: Matcher<T>,
    policy: Arc<RenderPolicy<T>>,
    view_type: Option<ViewType>,
}

impl<T: FlexItem> Entry<T> {
    fn accepts(&self, item: &T) -> bool {
        match &self.matcher {
            Matcher::KindOf => item.is_kind_of(self.key),
            Matcher::Predicate(matches) => matches(item),
        }
    }
}

/// Lookup tables, rebuilt lazily as items are resolved.
struct Tables<T: FlexItem> {
    policies: HashMap<ViewType, Arc<RenderPolicy<T>>>,
    implicit_tags: HashMap<TypeKey, ViewType>,
    explicit_tags: HashMap<TypeKey, ViewType>,
    /// Concrete type -> registration its cache entry was derived from.
    derived_from: HashMap<TypeKey, TypeKey>,
    next_tag: u32,
}

impl<T: FlexItem> Tables<T> {
    fn new() -> Self {
        Self {
            policies: HashMap::new(),
            implicit_tags: HashMap::new(),
            explicit_tags: HashMap::new(),
            derived_from: HashMap::new(),
            next_tag: ViewType::AUTO_BASE,
        }
    }

    fn implicit_tag(&mut self, key: TypeKey) -> ViewType {
        if let Some(tag) = self.implicit_tags.get(&key) {
            return *tag;
        }
        let tag = ViewType::new(self.next_tag);
        self.next_tag += 1;
        self.implicit_tags.insert(key, tag);
        tag
    }

    fn tag_of(&self, key: TypeKey) -> Option<ViewType> {
        self.explicit_tags
            .get(&key)
            .or_else(|| self.implicit_tags.get(&key))
            .copied()
    }

    fn lookup(&self, key: TypeKey) -> Option<Arc<RenderPolicy<T>>> {
        self.tag_of(key)
            .and_then(|tag| self.policies.get(&tag))
            .cloned()
    }

    /// Drops every cache entry derived from `base`. Returns how many went.
    fn invalidate_derived(&mut self, base: TypeKey) -> usize {
        let derived: Vec<TypeKey> = self
            .derived_from
            .iter()
            .filter(|(_, from)| **from == base)
            .map(|(concrete, _)| *concrete)
            .collect();
        for concrete in &derived {
            self.derived_from.remove(concrete);
            self.explicit_tags.remove(concrete);
            if let Some(tag) = self.implicit_tags.get(concrete) {
                self.policies.remove(tag);
            }
        }
        derived.len()
    }
}

/// Maps item types to render policies.
pub struct TypeRegistry<T: FlexItem> {
    entries: Vec<Entry<T>>,
    tables: RwLock<Tables<T>>,
    factories: HashMap<ViewType, ViewFactory<T::View>>,
}

impl<T: FlexItem> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FlexItem> TypeRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            tables: RwLock::new(Tables::new()),
            factories: HashMap::new(),
        }
    }

    /// Registers `policy` for items of kind `key`.
    ///
    /// Items match when [`is_kind_of(key)`](crate::ItemKind::is_kind_of)
    /// holds. With `view_type` set, the policy is stored under that explicit
    /// tag; otherwise under an implicit tag allocated for `key`.
    pub fn register(
        &mut self,
        key: TypeKey,
        policy: RenderPolicy<T>,
        view_type: Option<ViewType>,
    ) -> Result<Registered> {
        self.insert_entry(key, Matcher::KindOf, policy, view_type)
    }

    /// Registers `policy` for items accepted by `matches`.
    ///
    /// `key` names the registration and its concrete type; `matches` decides
    /// which other types fall back to it.
    pub fn register_matching<F>(
        &mut self,
        key: TypeKey,
        matches: F,
        policy: RenderPolicy<T>,
        view_type: Option<ViewType>,
    ) -> Result<Registered>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.insert_entry(key, Matcher::Predicate(Arc::new(matches)), policy, view_type)
    }

    fn insert_entry(
        &mut self,
        key: TypeKey,
        matcher: Matcher<T>,
        policy: RenderPolicy<T>,
        view_type: Option<ViewType>,
    ) -> Result<Registered> {
        if T::is_self_describing_kind(key) {
            return Err(Error::ConflictingRegistration {
                type_name: key.name(),
            });
        }

        let policy = Arc::new(policy);
        let tables = self.tables.get_mut();
        let tag = match view_type {
            Some(tag) => {
                tables.explicit_tags.insert(key, tag);
                tag
            }
            None => {
                tables.explicit_tags.remove(&key);
                tables.implicit_tag(key)
            }
        };
        tables.policies.insert(tag, Arc::clone(&policy));
        tables.derived_from.remove(&key);

        let entry = Entry {
            key,
            matcher,
            policy,
            view_type,
        };
        let outcome = match self.entries.iter().position(|e| e.key == key) {
            Some(index) => {
                self.entries[index] = entry;
                let invalidated = tables.invalidate_derived(key);
                if invalidated > 0 {
                    tracing::warn!(
                        target: targets::REGISTRY,
                        %key,
                        invalidated,
                        "re-registered a base type; derived entries invalidated"
                    );
                }
                Registered::Replaced
            }
            None => {
                self.entries.push(entry);
                Registered::New
            }
        };

        tracing::debug!(target: targets::REGISTRY, %key, ?tag, ?outcome, "registered type");
        Ok(outcome)
    }

    /// Resolves the render policy of `item`.
    pub fn resolve<'a>(&self, item: &'a T) -> Result<Resolved<'a, T>> {
        if let Some(described) = item.self_described() {
            return Ok(Resolved::SelfDescribed(described));
        }
        let (_, policy) = self.resolve_registered(item)?;
        Ok(Resolved::Registered(policy))
    }

    /// Returns the view-type tag of `item`.
    pub fn view_type_of(&self, item: &T) -> Result<ViewType> {
        if let Some(described) = item.self_described() {
            return Ok(described.view_type());
        }
        let (tag, _) = self.resolve_registered(item)?;
        Ok(tag)
    }

    fn resolve_registered(&self, item: &T) -> Result<(ViewType, Arc<RenderPolicy<T>>)> {
        let key = item.type_key();
        {
            let tables = self.tables.read();
            if let Some(tag) = tables.tag_of(key)
                && let Some(policy) = tables.policies.get(&tag)
            {
                return Ok((tag, Arc::clone(policy)));
            }
        }

        let Some(entry) = self.entries.iter().find(|e| e.accepts(item)) else {
            return Err(Error::UnregisteredType {
                type_name: key.name(),
                registered: self.registered_type_names(),
            });
        };

        let mut tables = self.tables.write();
        if matches!(entry.matcher, Matcher::Predicate(_)) {
            // Predicates see values, so their answer holds for this item only.
            let tag = match entry.view_type {
                Some(tag) => tag,
                None => tables.implicit_tag(entry.key),
            };
            return Ok((tag, Arc::clone(&entry.policy)));
        }

        let tag = match entry.view_type {
            Some(tag) => {
                tables.explicit_tags.insert(key, tag);
                tag
            }
            None => tables.implicit_tag(key),
        };
        tables.policies.insert(tag, Arc::clone(&entry.policy));
        tables.derived_from.insert(key, entry.key);
        tracing::trace!(target: targets::REGISTRY, concrete = %key, base = %entry.key, "cached derived policy");

        Ok((tag, Arc::clone(&entry.policy)))
    }

    /// Returns `true` if `key` has its own registration.
    pub fn is_registered(&self, key: TypeKey) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Names of all registered types, in registration order.
    pub fn registered_type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.key.name()).collect()
    }

    /// Notes that `item` is in the collection.
    ///
    /// Self-describing items contribute their view factory (first one per
    /// view type wins); other items are resolved so their cache entry is warm.
    pub fn record(&mut self, item: &T) -> Result<()> {
        if let Some(described) = item.self_described() {
            self.factories
                .entry(described.view_type())
                .or_insert_with(|| described.view_factory());
            return Ok(());
        }
        self.resolve(item).map(|_| ())
    }

    /// Forgets every recorded view factory.
    pub fn clear_factories(&mut self) {
        self.factories.clear();
    }

    /// Creates a view for `view_type`.
    ///
    /// Uses the factory recorded for a self-describing item when there is
    /// one, else inflates the layout of the policy stored under the tag.
    pub fn create_view(
        &self,
        view_type: ViewType,
        inflate: &mut dyn FnMut(LayoutId) -> T::View,
    ) -> Result<T::View> {
        if let Some(factory) = self.factories.get(&view_type) {
            return Ok(factory(inflate));
        }
        let layout = self
            .tables
            .read()
            .policies
            .get(&view_type)
            .map(|policy| policy.layout());
        match layout {
            Some(layout) => Ok(inflate(layout)),
            None => Err(Error::UnknownViewType(view_type)),
        }
    }
}

impl<T: FlexItem> fmt::Debug for TypeRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("TypeRegistry")
            .field("registered", &self.registered_type_names())
            .field("cached_policies", &tables.policies.len())
            .field("derived", &tables.derived_from.len())
            .field("factories", &self.factories.len())
            .finish()
    }
}
