//! Coded enums with human-readable labels.

/// Enum identified by a short stable code.
pub trait Kind: Copy + Sized + 'static {
    /// All the variants, in declaration order.
    const ALL: &'static [Self];

    /// Returns the stable code of this variant, as stored and passed around in
    /// query strings.
    fn code(self) -> &'static str;

    /// Returns the human-readable label of this variant.
    fn label(self) -> &'static str;
}

/// Macro for defining a coded enum.
///
/// # Example
///
/// ```rust
/// # use common::{define_kind, Kind as _};
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Shape {
///         #[doc = "A cube."]
///         Cube = "CU" => "Cube",
///
///         #[doc = "A sphere."]
///         Sphere = "SP" => "Sphere",
///     }
/// }
///
/// assert_eq!(Shape::Cube.code(), "CU");
/// assert_eq!("SP".parse::<Shape>().unwrap(), Shape::Sphere);
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $code:literal => $label:literal
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
        )]
        #[doc = $doc]
        pub enum $name {
            $(
                #[doc = $variant_doc]
                #[strum(serialize = $code)]
                $variant,
            )*
        }

        impl $crate::Kind for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),*];

            fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(BPCHAR, VARCHAR, TEXT);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let code = <&str as $crate::private::postgres_types::FromSql>
                    ::from_sql(ty, raw)?;
                <Self as ::core::str::FromStr>::from_str(code.trim_end())
                    .map_err(|_| ::std::format!(
                        "invalid `{}` value: {code}",
                        ::core::stringify!($name),
                    ).into())
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(BPCHAR, VARCHAR, TEXT);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                <&str as $crate::private::postgres_types::ToSql>::to_sql(
                    &$crate::Kind::code(*self),
                    ty,
                    w,
                )
            }
        }
    };
}
