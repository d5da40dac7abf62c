use std::env;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

impl ServiceContext {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::resolve(component, env::var("SERVICE_NAME").ok(), env::var("STAGE").ok())
    }

    fn resolve(component: &str, service_name: Option<String>, stage: Option<String>) -> Self {
        let component = component.trim().to_string();
        let service_name = service_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());
        let environment = stage
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            service_name,
            environment,
            component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_component_and_unknown_stage() {
        let context = ServiceContext::resolve("subtrack-api", None, Some("  ".to_string()));
        assert_eq!(context.service_name, "subtrack-api");
        assert_eq!(context.environment, "unknown");
    }

    #[test]
    fn uses_configured_values() {
        let context = ServiceContext::resolve(
            "subtrack-api",
            Some("subtrack".to_string()),
            Some("Production".to_string()),
        );
        assert_eq!(context.service_name, "subtrack");
        assert_eq!(context.environment, "production");
        assert_eq!(context.component, "subtrack-api");
    }
}
