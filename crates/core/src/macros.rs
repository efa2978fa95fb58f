// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`] — `Display` impl mapping unit variants to labels
//! - [`test_builder!`] — test builder over the three field shapes the
//!   model structs use (string, plain value, optional)

/// Generate a `Display` impl mapping each unit variant to a label.
///
/// The model enums (protocols, operations, purposes) are all plain unit
/// variants, so that is the only shape supported.
///
/// ```ignore
/// crate::simple_display! {
///     MyEnum {
///         Foo => "foo",
///         Bar => "bar",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident => $label:literal ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let label = match self {
                    $( Self::$variant => $label, )+
                };
                f.write_str(label)
            }
        }
    };
}

/// Generate a test builder (struct + Default + setters + `build()`),
/// gated behind `#[cfg(any(test, feature = "test-support"))]`.
///
/// Fields are declared in three groups matching how the model structs are
/// shaped:
/// - `text { field = "default" }` — a `String` field; the setter takes
///   `impl Into<String>`
/// - `value { field: Type = default }` — any other concrete field; the
///   setter takes `Type` directly
/// - `unset { field: Type }` — an `Option<Type>` field defaulting to
///   `None`; the setter wraps `Some(v.into())`
///
/// ```ignore
/// crate::test_builder! {
///     pub struct FooBuilder => Foo {
///         text { name = "test" }
///         value { count: u32 = 0 }
///         unset { label: String }
///     }
/// }
/// ```
#[macro_export]
macro_rules! test_builder {
    (
        pub struct $builder:ident => $target:ident {
            text {
                $( $text_field:ident = $text_default:literal ),* $(,)?
            }
            value {
                $( $value_field:ident : $value_ty:ty = $value_default:expr ),* $(,)?
            }
            unset {
                $( $unset_field:ident : $unset_ty:ty ),* $(,)?
            }
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder {
            $( $text_field: String, )*
            $( $value_field: $value_ty, )*
            $( $unset_field: Option<$unset_ty>, )*
        }

        #[cfg(any(test, feature = "test-support"))]
        impl Default for $builder {
            fn default() -> Self {
                Self {
                    $( $text_field: $text_default.into(), )*
                    $( $value_field: $value_default, )*
                    $( $unset_field: None, )*
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $(
                pub fn $text_field(mut self, v: impl Into<String>) -> Self {
                    self.$text_field = v.into();
                    self
                }
            )*

            $(
                pub fn $value_field(mut self, v: $value_ty) -> Self {
                    self.$value_field = v;
                    self
                }
            )*

            $(
                pub fn $unset_field(mut self, v: impl Into<$unset_ty>) -> Self {
                    self.$unset_field = Some(v.into());
                    self
                }
            )*

            pub fn build(self) -> $target {
                $target {
                    $( $text_field: self.$text_field, )*
                    $( $value_field: self.$value_field, )*
                    $( $unset_field: self.$unset_field, )*
                }
            }
        }
    };
}
