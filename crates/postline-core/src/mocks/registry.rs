//! Route table for the mock server.
//!
//! Endpoint specs are compiled once into [`Route`]s: the path template is
//! parsed and every condition predicate is compiled up front. Lookups go
//! through a single generic handler instead of one closure per route.

use crate::error::ValidationError;
use crate::expression::Predicate;
use crate::matching::{PathParams, PathTemplate};
use crate::types::endpoint::{Condition, EndpointSpec, MockConfig};
use crate::types::request::HttpMethod;
use serde_json::Value;
use std::collections::HashMap;

/// Condition with its predicate compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    pub source: String,
    /// `None` when the predicate failed to compile; such a condition never matches
    pub predicate: Option<Predicate>,
    pub response: Value,
    pub status_code: u16,
}

impl CompiledCondition {
    fn compile(condition: &Condition, path: &str) -> Self {
        let predicate = match Predicate::parse(&condition.when) {
            Ok(predicate) => Some(predicate),
            Err(err) => {
                tracing::warn!(
                    path = %path,
                    condition = %condition.when,
                    error = %err,
                    "Invalid condition, it will never match"
                );
                None
            }
        };

        Self {
            source: condition.when.clone(),
            predicate,
            response: condition.response.clone(),
            status_code: condition.status_code,
        }
    }

    pub fn matches(&self, params: &PathParams) -> bool {
        self.predicate
            .as_ref()
            .is_some_and(|predicate| predicate.matches(params))
    }
}

/// A registered mock endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub method: HttpMethod,
    pub template: PathTemplate,
    pub response: Value,
    pub status_code: u16,
    pub conditions: Vec<CompiledCondition>,
}

impl Route {
    pub fn compile(spec: &EndpointSpec) -> Result<Self, ValidationError> {
        let template = PathTemplate::parse(&spec.path)?;
        let conditions = spec
            .conditions
            .iter()
            .map(|condition| CompiledCondition::compile(condition, &spec.path))
            .collect();

        Ok(Self {
            method: spec.method,
            template,
            response: spec.response.clone(),
            status_code: spec.status_code,
            conditions,
        })
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}

/// Routes in registration order, keyed by (method, template).
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    index: HashMap<(HttpMethod, String), usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every endpoint of `config`, in order.
    pub fn from_config(config: &MockConfig) -> Result<Self, ValidationError> {
        let mut table = Self::new();
        for spec in &config.endpoints {
            table.register(spec)?;
        }
        Ok(table)
    }

    /// Compile and add one endpoint.
    ///
    /// A second registration for the same method and template replaces the
    /// first one while keeping its position.
    pub fn register(&mut self, spec: &EndpointSpec) -> Result<(), ValidationError> {
        let route = Route::compile(spec)?;
        self.insert(route);
        Ok(())
    }

    pub fn insert(&mut self, route: Route) {
        let key = (route.method, route.template.as_str().to_string());
        match self.index.get(&key) {
            Some(&position) => {
                tracing::warn!(
                    method = %route.method,
                    path = %route.template.as_str(),
                    "Duplicate endpoint, replacing the earlier definition"
                );
                self.routes[position] = route;
            }
            None => {
                tracing::debug!(
                    method = %route.method,
                    path = %route.template.as_str(),
                    conditions = route.conditions.len(),
                    "Registered endpoint"
                );
                self.index.insert(key, self.routes.len());
                self.routes.push(route);
            }
        }
    }

    /// Find the route serving `method` and `path`.
    ///
    /// When several templates match, the one with the most literal segments
    /// wins; ties go to the earliest registration.
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<RouteMatch<'_>> {
        let mut best: Option<RouteMatch<'_>> = None;

        for route in self.routes.iter().filter(|route| route.method == method) {
            let Some(params) = route.template.matches(path) else {
                continue;
            };
            let better = best.as_ref().map_or(true, |current| {
                route.template.literal_count() > current.route.template.literal_count()
            });
            if better {
                best = Some(RouteMatch { route, params });
            }
        }

        best
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
