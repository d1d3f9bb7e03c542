/// Pattern parsing for template segments
///
/// Pure parsing of `/r/:id:number`-style templates into typed segments.
/// All functions are **pure**: same input → same output, no side effects.
use crate::{ParamType, RouteError};

/// A single segment of a route template
///
/// # Examples
///
/// ```
/// use waylink_router::route::pattern::{classify_segment, PatternSegmentType};
///
/// let seg = classify_segment("r").unwrap();
/// assert!(matches!(seg, PatternSegmentType::Static(_)));
///
/// let seg = classify_segment(":id").unwrap();
/// assert!(matches!(seg, PatternSegmentType::Param(_, None)));
///
/// let seg = classify_segment(":id:number").unwrap();
/// assert!(matches!(seg, PatternSegmentType::Param(_, Some(_))));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegmentType {
    /// Parameter segment: `:id` or `:id:number`
    Param(String, Option<ParamType>),
    /// Literal text segment
    Static(String),
}

impl PatternSegmentType {
    /// Template form of this segment, without the type annotation
    pub fn as_template(&self) -> String {
        match self {
            PatternSegmentType::Param(name, _) => format!(":{}", name),
            PatternSegmentType::Static(text) => text.clone(),
        }
    }
}

/// Classifies a template segment (pure function)
///
/// # Parsing Rules
///
/// 1. **Param**: `:name` or `:name:type`
/// 2. **Static**: anything else
///
/// # Errors
///
/// Returns [`RouteError::InvalidTemplate`] for an empty parameter name and
/// [`RouteError::UnknownParamType`] for an unrecognized type annotation.
pub fn classify_segment(segment: &str) -> Result<PatternSegmentType, RouteError> {
    match segment.strip_prefix(':') {
        Some(param_part) => {
            let (name, constraint) = parse_param_with_constraint(param_part)?;
            if name.is_empty() {
                return Err(RouteError::invalid_template(segment, "empty parameter name"));
            }
            Ok(PatternSegmentType::Param(name, constraint))
        }
        None => Ok(PatternSegmentType::Static(segment.to_string())),
    }
}

/// Parses a parameter name and optional type annotation (pure function)
///
/// Maps `"name"` or `"name:type"` → `(name, Option<ParamType>)`. Only the first
/// colon separates; the rest belongs to the type.
///
/// # Examples
///
/// ```
/// use waylink_router::route::pattern::parse_param_with_constraint;
/// use waylink_router::ParamType;
///
/// let (name, ty) = parse_param_with_constraint("id").unwrap();
/// assert_eq!(name, "id");
/// assert_eq!(ty, None);
///
/// let (name, ty) = parse_param_with_constraint("id:number").unwrap();
/// assert_eq!(name, "id");
/// assert_eq!(ty, Some(ParamType::Number));
/// ```
pub fn parse_param_with_constraint(
    param: &str,
) -> Result<(String, Option<ParamType>), RouteError> {
    match param.split_once(':') {
        Some((name, constraint)) => Ok((name.to_string(), Some(constraint.parse()?))),
        None => Ok((param.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static() {
        let seg = classify_segment("about").unwrap();
        assert_eq!(seg, PatternSegmentType::Static("about".to_string()));
    }

    #[test]
    fn test_classify_param() {
        let seg = classify_segment(":id").unwrap();
        assert_eq!(seg, PatternSegmentType::Param("id".to_string(), None));
    }

    #[test]
    fn test_classify_param_with_type() {
        let seg = classify_segment(":id:number").unwrap();
        assert_eq!(
            seg,
            PatternSegmentType::Param("id".to_string(), Some(ParamType::Number))
        );
    }

    #[test]
    fn test_classify_param_with_enum() {
        let seg = classify_segment(":tab:enum(chat|details)").unwrap();
        assert_eq!(
            seg,
            PatternSegmentType::Param(
                "tab".to_string(),
                Some(ParamType::Enum(vec!["chat".into(), "details".into()]))
            )
        );
    }

    #[test]
    fn test_classify_rejects_empty_name() {
        assert!(classify_segment(":").is_err());
        assert!(classify_segment("::number").is_err());
    }

    #[test]
    fn test_classify_rejects_unknown_type() {
        assert_eq!(
            classify_segment(":id:uuid"),
            Err(RouteError::UnknownParamType("uuid".to_string()))
        );
    }

    #[test]
    fn test_as_template() {
        let seg = classify_segment(":id:number").unwrap();
        assert_eq!(seg.as_template(), ":id");
    }
}
