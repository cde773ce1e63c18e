//! Declarative macros for the pipeline DSL

/// Builds the parameter list of a `print` command.
///
/// Items are literals (anything convertible into a
/// [`PrintParam`](crate::pipeline::PrintParam)) or `ref "name"` for a store
/// variable resolved when the command runs.
///
/// ```
/// use pipelyne::params;
/// use pipelyne::pipeline::PrintParam;
///
/// let params = params!["version =", ref "version", 3, true];
/// assert_eq!(params[1], PrintParam::reference("version"));
/// assert_eq!(params.len(), 4);
/// ```
#[macro_export]
macro_rules! params {
    (@acc [$($out:expr,)*]) => {{
        let params: ::std::vec::Vec<$crate::pipeline::PrintParam> = vec![$($out),*];
        params
    }};
    (@acc [$($out:expr,)*] ref $name:expr $(, $($rest:tt)*)?) => {
        $crate::params!(@acc [$($out,)* $crate::pipeline::PrintParam::reference($name),] $($($rest)*)?)
    };
    (@acc [$($out:expr,)*] $value:expr $(, $($rest:tt)*)?) => {
        $crate::params!(@acc [$($out,)* $crate::pipeline::PrintParam::from($value),] $($($rest)*)?)
    };
    ($($items:tt)*) => {
        $crate::params!(@acc [] $($items)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::pipeline::{PrintParam, StoreValue};

    #[test]
    fn test_params_empty() {
        let params = params![];
        assert!(params.is_empty());
    }

    #[test]
    fn test_params_mixed() {
        let name = String::from("count");
        let params = params!["count =", ref name.clone(), 2.5, false,];
        assert_eq!(
            params,
            vec![
                PrintParam::from("count ="),
                PrintParam::reference("count"),
                PrintParam::Literal(StoreValue::Number(2.5)),
                PrintParam::Literal(StoreValue::Bool(false)),
            ]
        );
    }

    #[test]
    fn test_params_only_references() {
        let params = params![ref "a", ref "b"];
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|p| matches!(p, PrintParam::Reference { .. })));
    }
}
