//! FluxTest Macros
//!
//! Procedural macros for test container registration and async wrapping.
//!
//! ## Macros
//!
//! - `#[flux::container]` - Register an inherent `impl` block as a test container
//!
//! ## Method Markers
//!
//! Inside a container `impl`, methods are marked with helper attributes that
//! the macro consumes:
//!
//! - `#[case]` / `#[case(name = "...")]` - test case, `&mut self`
//! - `#[ignore]` - on a test case, skip it
//! - `#[class_init]` / `#[class_cleanup]` - no receiver, no arguments
//! - `#[test_init]` / `#[test_cleanup]` - `&mut self`
//!
//! Any of these may be an `async fn`; it is driven to completion on a
//! current-thread Tokio runtime.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Attribute, ImplItem, ImplItemFn, ItemImpl, parse_macro_input};

// ============================================================================
// Attribute Parsing Helpers
// ============================================================================

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Parse a boolean literal attribute: `attr = true`
    pub fn bool(meta: &ParseNestedMeta) -> syn::Result<bool> {
        let value: syn::LitBool = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// A bare flag (`attr`) or an explicit boolean (`attr = false`)
    pub fn flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
        if meta.input.peek(syn::Token![=]) {
            bool(meta)
        } else {
            Ok(true)
        }
    }

    /// Parse a string literal holding a path: `attr = "Self::connect"`
    pub fn path(meta: &ParseNestedMeta) -> syn::Result<syn::ExprPath> {
        let value: syn::LitStr = meta.value()?.parse()?;
        value.parse()
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Register a test container
///
/// # Example
///
/// ```ignore
/// #[derive(Default)]
/// struct Accounts {
///     ledger: Vec<i64>,
/// }
///
/// #[flux::container]
/// impl Accounts {
///     #[test_init]
///     fn open(&mut self) {
///         self.ledger.push(100);
///     }
///
///     #[case]
///     fn withdraw(&mut self) -> Result<(), LedgerError> {
///         self.ledger.push(-40);
///         check_balance(&self.ledger)
///     }
///
///     #[case(name = "slow_audit")]
///     #[ignore]
///     fn audit(&mut self) {}
///
///     #[class_init]
///     async fn start_database() -> Result<(), DbError> { ... }
/// }
///
/// // Custom name, fallible constructor
/// #[flux::container(name = "bank::Transfers", new = "Self::connect")]
/// impl Transfers {
///     fn connect() -> Result<Self, DbError> { ... }
///     ...
/// }
/// ```
///
/// Without `name`, the container is named `module_path::Type`. Without
/// `new`, instances are built with `Default::default()`.
#[proc_macro_attribute]
pub fn container(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let input = parse_macro_input!(item as ItemImpl);

    container_impl(args, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

#[derive(Default)]
struct ContainerConfig {
    name: Option<String>,
    ignore: bool,
    new: Option<syn::ExprPath>,
}

fn parse_container_config(args: TokenStream2) -> Result<ContainerConfig, syn::Error> {
    let mut config = ContainerConfig::default();

    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "name" => config.name = Some(attr::string(&meta)?),
            "ignore" => config.ignore = attr::flag(&meta)?,
            "new" => config.new = Some(attr::path(&meta)?),
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });

    syn::parse::Parser::parse2(parser, args)?;
    Ok(config)
}

/// Role a marked method plays in its container
#[derive(Debug, Clone, PartialEq)]
enum Marker {
    Case { name: Option<String> },
    ClassInit,
    ClassCleanup,
    TestInit,
    TestCleanup,
}

impl Marker {
    fn from_attr(attr: &Attribute) -> syn::Result<Option<Marker>> {
        let Some(ident) = attr.path().get_ident() else {
            return Ok(None);
        };
        let marker = match ident.to_string().as_str() {
            "case" => Marker::Case {
                name: parse_case_name(attr)?,
            },
            "class_init" => Marker::ClassInit,
            "class_cleanup" => Marker::ClassCleanup,
            "test_init" => Marker::TestInit,
            "test_cleanup" => Marker::TestCleanup,
            _ => return Ok(None),
        };
        if !matches!(marker, Marker::Case { .. }) {
            attr.meta.require_path_only()?;
        }
        Ok(Some(marker))
    }

    fn label(&self) -> &'static str {
        match self {
            Marker::Case { .. } => "#[case]",
            Marker::ClassInit => "#[class_init]",
            Marker::ClassCleanup => "#[class_cleanup]",
            Marker::TestInit => "#[test_init]",
            Marker::TestCleanup => "#[test_cleanup]",
        }
    }

    fn takes_instance(&self) -> bool {
        !matches!(self, Marker::ClassInit | Marker::ClassCleanup)
    }

    fn builder_method(&self, ignored: bool) -> TokenStream2 {
        match self {
            Marker::Case { .. } if ignored => quote! { ignored_case },
            Marker::Case { .. } => quote! { case },
            Marker::ClassInit => quote! { class_init },
            Marker::ClassCleanup => quote! { class_cleanup },
            Marker::TestInit => quote! { test_init },
            Marker::TestCleanup => quote! { test_cleanup },
        }
    }
}

fn parse_case_name(attr: &Attribute) -> syn::Result<Option<String>> {
    let mut name = None;
    if let syn::Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            let key = attr::name(&meta);
            match key.as_str() {
                "name" => name = Some(attr::string(&meta)?),
                _ => return Err(attr::unknown(&meta, &key)),
            }
            Ok(())
        })?;
    }
    Ok(name)
}

/// A marked method, with its helper attributes stripped
struct MarkedFn {
    marker: Marker,
    ignored: bool,
    ident: syn::Ident,
    is_async: bool,
}

impl MarkedFn {
    fn registration_call(&self) -> TokenStream2 {
        let method = self.marker.builder_method(self.ignored);
        let ident = &self.ident;
        let name = match &self.marker {
            Marker::Case { name: Some(name) } => name.clone(),
            _ => ident.to_string(),
        };

        let call = if self.marker.takes_instance() {
            quote! { this.#ident() }
        } else {
            quote! { Self::#ident() }
        };
        let body = if self.is_async {
            let runner = generate_async_runner(call);
            quote! { -> ::fluxtest::TestResult #runner }
        } else {
            call
        };

        if self.marker.takes_instance() {
            quote! { .#method(#name, |this: &mut Self| #body) }
        } else {
            quote! { .#method(#name, || #body) }
        }
    }
}

/// Strip helper attributes from `method` and record its marker, if any
fn take_marker(method: &mut ImplItemFn) -> syn::Result<Option<MarkedFn>> {
    let mut marker: Option<Marker> = None;
    let mut ignore_attr: Option<Attribute> = None;
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attr in std::mem::take(&mut method.attrs) {
        if attr.path().is_ident("ignore") {
            ignore_attr = Some(attr);
            continue;
        }
        match Marker::from_attr(&attr)? {
            Some(found) => {
                if let Some(previous) = &marker {
                    return Err(syn::Error::new_spanned(
                        &attr,
                        format!(
                            "FluxTest: method is already marked {}; a method fills one role",
                            previous.label()
                        ),
                    ));
                }
                marker = Some(found);
            }
            None => kept.push(attr),
        }
    }
    method.attrs = kept;

    let Some(marker) = marker else {
        if let Some(attr) = ignore_attr {
            return Err(syn::Error::new_spanned(
                attr,
                "FluxTest: #[ignore] only applies to #[case] methods",
            ));
        }
        return Ok(None);
    };

    if ignore_attr.is_some() && !matches!(marker, Marker::Case { .. }) {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "FluxTest: #[ignore] only applies to #[case] methods",
        ));
    }

    validate_signature(method, &marker)?;

    Ok(Some(MarkedFn {
        ignored: ignore_attr.is_some(),
        ident: method.sig.ident.clone(),
        is_async: method.sig.asyncness.is_some(),
        marker,
    }))
}

fn validate_signature(method: &ImplItemFn, marker: &Marker) -> syn::Result<()> {
    let sig = &method.sig;
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            format!("FluxTest: {} methods cannot be generic", marker.label()),
        ));
    }

    if marker.takes_instance() {
        let mut_ref_self = sig.receiver().is_some_and(|r| {
            r.reference.is_some() && r.mutability.is_some() && r.colon_token.is_none()
        });
        if !mut_ref_self || sig.inputs.len() != 1 {
            return Err(syn::Error::new_spanned(
                sig,
                format!(
                    "FluxTest: {} methods must take exactly one argument: `&mut self`",
                    marker.label()
                ),
            ));
        }
    } else if !sig.inputs.is_empty() {
        return Err(syn::Error::new_spanned(
            sig,
            format!(
                "FluxTest: {} methods must not take `self` or any argument",
                marker.label()
            ),
        ));
    }
    Ok(())
}

fn container_impl(args: TokenStream2, mut input: ItemImpl) -> Result<TokenStream2, syn::Error> {
    let config = parse_container_config(args)?;

    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "FluxTest: #[flux::container] must be placed on an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "FluxTest: generic containers are not supported",
        ));
    }

    let type_name = match input.self_ty.as_ref() {
        syn::Type::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
    .ok_or_else(|| {
        syn::Error::new_spanned(&input.self_ty, "FluxTest: container must be a named type")
    })?;

    let mut marked = Vec::new();
    for item in &mut input.items {
        if let ImplItem::Fn(method) = item {
            if let Some(found) = take_marker(method)? {
                marked.push(found);
            }
        }
    }

    let self_ty = &input.self_ty;
    let registration_fn = format_ident!("__fluxtest_registration");
    let name = match &config.name {
        Some(name) => quote! { #name },
        None => quote! { ::core::concat!(::core::module_path!(), "::", #type_name) },
    };
    let builder = match &config.new {
        Some(ctor) => quote! { ::fluxtest::ContainerBuilder::<Self>::new(#name, #ctor) },
        None => quote! { ::fluxtest::ContainerBuilder::<Self>::with_default(#name) },
    };
    let ignored = config.ignore;
    let calls: Vec<_> = marked.iter().map(MarkedFn::registration_call).collect();

    Ok(quote! {
        #input

        #[doc(hidden)]
        impl #self_ty {
            fn #registration_fn() -> ::fluxtest::Registration {
                #builder
                    .ignore(#ignored)
                    #(#calls)*
                    .build()
            }
        }

        ::fluxtest::internal::inventory::submit! {
            ::fluxtest::ContainerDef {
                name: #name,
                build: <#self_ty>::#registration_fn,
                file: file!(),
                line: line!(),
                module_path: module_path!(),
            }
        }
    })
}

fn generate_async_runner(call: TokenStream2) -> TokenStream2 {
    quote! {
        {
            let rt = ::fluxtest::internal::tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| {
                    ::fluxtest::CapturedError::invocation_fault(
                        "FluxTest: Failed to create async runtime",
                    )
                    .with_cause(e)
                })?;

            ::fluxtest::IntoTestResult::into_test_result(rt.block_on(#call))
        }
    }
}
