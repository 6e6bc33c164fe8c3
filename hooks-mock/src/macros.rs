/// Fire an action on the thread's default registry.
///
/// Every argument after the hook name is converted into a
/// [`HookValue`](crate::HookValue).
///
/// ```
/// use hooks_mock::{do_action, assert_action_fired};
/// use serde_json::json;
///
/// do_action!("save_post", 42_i64, true).unwrap();
/// assert_action_fired("save_post", Some(&[json!(42), json!(true)])).unwrap();
/// ```
#[macro_export]
macro_rules! do_action {
    ($hook:expr $(, $arg:expr)* $(,)?) => {
        $crate::do_action(
            $hook,
            ::std::vec![$(::std::convert::Into::<$crate::HookValue>::into($arg)),*],
        )
    };
}

/// Fire a filter on the thread's default registry.
///
/// The first argument after the hook name is the value being filtered.
///
/// ```
/// use hooks_mock::apply_filters;
///
/// let record = apply_filters!("the_title", "Hello", 7_i64).unwrap();
/// assert_eq!(record.filtered_value().unwrap(), "Hello");
/// ```
#[macro_export]
macro_rules! apply_filters {
    ($hook:expr, $value:expr $(, $arg:expr)* $(,)?) => {
        $crate::apply_filters(
            $hook,
            ::std::vec![
                ::std::convert::Into::<$crate::HookValue>::into($value)
                $(, ::std::convert::Into::<$crate::HookValue>::into($arg))*
            ],
        )
    };
}
