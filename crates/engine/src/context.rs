use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

/// Request-scoped user data, keyed by type.
///
/// The engine never looks inside; resolvers and directives fetch what they put there with
/// [`ContextData::get`]. Cloning is cheap.
#[derive(Clone, Default)]
pub struct ContextData(Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>);

impl ContextData {
    pub fn insert<T: Any + Send + Sync>(&mut self, data: T) {
        Arc::make_mut(&mut self.0).insert(TypeId::of::<T>(), Arc::new(data));
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0
            .get(&TypeId::of::<T>())
            .and_then(|data| data.as_ref().downcast_ref::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ContextData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextData").field("len", &self.0.len()).finish()
    }
}
