use crate::core::context::TestContext;
use crate::utils::error::Result;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type CaseFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

type CaseBody = Arc<dyn for<'a> Fn(&'a TestContext) -> CaseFuture<'a> + Send + Sync>;

/// A single executable scenario. Data-driven scenarios register one case per
/// data row, distinguished by `params`.
#[derive(Clone)]
pub struct TestCase {
    pub class: &'static str,
    pub method: String,
    pub params: Vec<String>,
    pub description: String,
    pub groups: Vec<String>,
    body: CaseBody,
}

impl TestCase {
    pub fn new<F>(
        class: &'static str,
        method: impl Into<String>,
        description: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: for<'a> Fn(&'a TestContext) -> CaseFuture<'a> + Send + Sync + 'static,
    {
        Self {
            class,
            method: method.into(),
            params: Vec::new(),
            description: description.into(),
            groups: Vec::new(),
            body: Arc::new(body),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.groups.push(group.to_string());
        self
    }

    /// `method` or `method[arg, arg]` for data-driven cases.
    pub fn name(&self) -> String {
        if self.params.is_empty() {
            self.method.clone()
        } else {
            format!("{}[{}]", self.method, self.params.join(", "))
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.class, self.name())
    }

    pub fn run<'a>(&self, ctx: &'a TestContext) -> CaseFuture<'a> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("class", &self.class)
            .field("name", &self.name())
            .field("groups", &self.groups)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ApiTestError;

    #[test]
    fn test_names_include_data_row() {
        let plain = TestCase::new("DeletePlayer", "admin_can_delete_self", "d", |_ctx| {
            Box::pin(async { Ok::<(), ApiTestError>(()) })
        });
        assert_eq!(plain.name(), "admin_can_delete_self");
        assert_eq!(plain.full_name(), "DeletePlayer.admin_can_delete_self");

        let row = plain
            .clone()
            .with_params(vec!["supervisor".to_string(), "user".to_string()])
            .in_group("sanity");
        assert_eq!(row.name(), "admin_can_delete_self[supervisor, user]");
        assert_eq!(row.groups, vec!["sanity".to_string()]);
    }
}
