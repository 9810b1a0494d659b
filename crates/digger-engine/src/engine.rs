//! Multi-leg query driver

use digger_nestedset::Skeleton;
use digger_selector::{Selector, SyntaxError};

use crate::config::Config;
use crate::supplier::{MemorySupplier, NestedSetSupplier, SelectRequest, Supplier};
use crate::EngineError;

/// Runs selectors against any [`Supplier`], one phase at a time
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create an engine after validating its configuration.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        tracing::info!(
            "digger engine v{} ({}+{} digit positions)",
            crate::VERSION,
            config.integer_digits,
            config.fraction_digits
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Empty in-memory supplier using this engine's store options
    pub fn memory_supplier(&self) -> MemorySupplier {
        MemorySupplier::new(self.config.store_options())
    }

    /// Empty nested-set supplier using this engine's store options
    pub fn nestedset_supplier(&self) -> NestedSetSupplier {
        NestedSetSupplier::new(self.config.store_options())
    }

    /// Run a selector below `context` (the whole forest when empty).
    ///
    /// Each phase's result skeletons are the next phase's context, and each
    /// leg's result is the next leg's context.
    pub fn select<S: Supplier + ?Sized>(
        &self,
        supplier: &S,
        selector: &Selector,
        context: &[Skeleton],
    ) -> Result<Vec<Skeleton>, EngineError> {
        let mut scope = context.to_vec();

        for (leg_index, leg) in selector.legs.iter().enumerate() {
            if leg_index > 0 && scope.is_empty() {
                break;
            }
            for (phase_index, (combinator, phase)) in leg.steps().enumerate() {
                if phase_index > 0 && scope.is_empty() {
                    break;
                }
                let request = SelectRequest::new(phase.clone(), combinator, scope);
                scope = supplier.select(&request)?;
                tracing::trace!(
                    "[{}] leg {} phase {}: {} result(s)",
                    supplier.name(),
                    leg_index,
                    phase_index,
                    scope.len()
                );
            }
        }

        tracing::debug!(
            "[{}] {} matched {} model(s)",
            supplier.name(),
            selector,
            scope.len()
        );
        Ok(scope)
    }

    /// Parse and run a selector.
    pub fn select_str<S: Supplier + ?Sized>(
        &self,
        supplier: &S,
        selector: &str,
        context: &[Skeleton],
    ) -> Result<Vec<Skeleton>, EngineError> {
        let selector = digger_selector::parse(selector)?;
        self.select(supplier, &selector, context)
    }

    /// Parse without running, for callers that reuse a selector.
    pub fn parse(&self, selector: &str) -> Result<Selector, SyntaxError> {
        digger_selector::parse(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digger_tree::Draft;

    fn catalogue<S: Supplier>(supplier: &mut S) {
        supplier
            .append(
                None,
                vec![
                    Draft::new("product")
                        .with_class("onsale")
                        .with_attr("price", 80)
                        .with_child(Draft::new("caption").with_class("red"))
                        .with_child(Draft::new("caption").with_class("blue")),
                    Draft::new("product")
                        .with_attr("price", 120)
                        .with_child(Draft::new("caption").with_class("red")),
                ],
            )
            .unwrap();
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = Config {
            fraction_digits: 0,
            ..Config::default()
        };
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_pipeline_over_both_suppliers() {
        let engine = Engine::new(Config::default()).unwrap();
        let mut memory = engine.memory_supplier();
        let mut nested = engine.nestedset_supplier();
        catalogue(&mut memory);
        catalogue(&mut nested);

        for supplier in [&memory as &dyn Supplier, &nested as &dyn Supplier] {
            let found = engine
                .select_str(supplier, "product.onsale/caption.red", &[])
                .unwrap();
            assert_eq!(found.len(), 1, "{}", supplier.name());

            let cheap = engine
                .select_str(supplier, "product[price<100] > caption", &[])
                .unwrap();
            assert_eq!(cheap.len(), 2, "{}", supplier.name());
        }
    }

    #[test]
    fn test_empty_phase_stops_pipeline() {
        let engine = Engine::new(Config::default()).unwrap();
        let mut memory = engine.memory_supplier();
        catalogue(&mut memory);
        let found = engine.select_str(&memory, "missing caption", &[]).unwrap();
        assert!(found.is_empty());
        let found = engine.select_str(&memory, "missing/caption", &[]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let engine = Engine::new(Config::default()).unwrap();
        let memory = engine.memory_supplier();
        assert!(matches!(
            engine.select_str(&memory, "a[b", &[]),
            Err(EngineError::Syntax(_))
        ));
    }
}
