use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub(crate) type ScopeRef = Rc<RefCell<Scope>>;

/// A frame of bindings with an optional enclosing frame. Only used by the
/// lexical scoping strategy.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    bindings: BTreeMap<String, Value>,
    parent: Option<ScopeRef>,
}

impl Scope {
    pub(crate) fn new_ref(parent: Option<ScopeRef>) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            bindings: BTreeMap::new(),
            parent,
        }))
    }

    /// Looks `name` up in this frame, then in its ancestors.
    pub(crate) fn lookup(scope: &ScopeRef, name: &str) -> Option<Value> {
        let mut current = Rc::clone(scope);

        loop {
            let parent = {
                let frame = current.borrow();

                if let Some(value) = frame.bindings.get(name) {
                    return Some(value.clone());
                }

                frame.parent.clone()
            };

            current = parent?;
        }
    }

    pub(crate) fn assign(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    pub(crate) fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }
}

/// Where the interpreter keeps its bindings.
#[derive(Debug)]
pub(crate) enum Store {
    /// One flat table. Calls copy it and restore the copy afterwards.
    Dynamic(BTreeMap<String, Value>),
    /// A chain of frames, innermost first.
    Lexical(ScopeRef),
}

impl Store {
    pub(crate) fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Store::Dynamic(bindings) => bindings.get(name).cloned(),
            Store::Lexical(scope) => Scope::lookup(scope, name),
        }
    }

    pub(crate) fn assign(&mut self, name: &str, value: Value) {
        match self {
            Store::Dynamic(bindings) => {
                bindings.insert(name.to_string(), value);
            }
            Store::Lexical(scope) => scope.borrow_mut().assign(name, value),
        }
    }

    /// The scope a function defined now would capture.
    pub(crate) fn capture(&self) -> Option<ScopeRef> {
        match self {
            Store::Dynamic(_) => None,
            Store::Lexical(scope) => Some(Rc::clone(scope)),
        }
    }

    /// Prepares the store for a call and returns what has to be restored
    /// when the call ends.
    pub(crate) fn enter_call(&mut self, closure: Option<&ScopeRef>) -> Store {
        let parent = match self {
            Store::Dynamic(bindings) => return Store::Dynamic(bindings.clone()),
            Store::Lexical(scope) => {
                closure.map_or_else(|| Rc::clone(scope), Rc::clone)
            }
        };

        std::mem::replace(self, Store::Lexical(Scope::new_ref(Some(parent))))
    }

    /// Prepares the store for a class body and returns what has to be
    /// restored afterwards.
    pub(crate) fn enter_class(&mut self) -> Store {
        let fresh = match self {
            Store::Dynamic(_) => Store::Dynamic(BTreeMap::new()),
            Store::Lexical(scope) => {
                Store::Lexical(Scope::new_ref(Some(Rc::clone(scope))))
            }
        };

        std::mem::replace(self, fresh)
    }

    /// Bindings of the innermost frame.
    pub(crate) fn frame(&self) -> BTreeMap<String, Value> {
        match self {
            Store::Dynamic(bindings) => bindings.clone(),
            Store::Lexical(scope) => scope.borrow().bindings().clone(),
        }
    }
}
