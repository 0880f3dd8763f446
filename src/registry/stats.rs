#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryMetrics {
    pub total_routes_registered: usize,
    pub total_method_bindings: usize,
}

impl RegistryMetrics {
    pub fn record_insert(&mut self, methods: usize) {
        self.total_routes_registered += 1;
        self.total_method_bindings += methods;
    }
}
