use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, ItemFn, LitStr, Token, parse_macro_input};

/// Library name given to `#[backend(...)]`, either `"name"` or
/// `library = "name"`.
struct BackendArgs {
    library: LitStr,
}

impl Parse for BackendArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self {
                library: input.parse()?,
            });
        }

        let key: Ident = input.parse()?;
        if key != "library" {
            return Err(syn::Error::new(
                key.span(),
                format!("unknown argument `{key}`, expected `library`"),
            ));
        }
        input.parse::<Token![=]>()?;
        Ok(Self {
            library: input.parse()?,
        })
    }
}

/// Implementation of the `#[backend(...)]` attribute macro.
///
/// Leaves the decorated `fn() -> BackendModule` unchanged and appends a
/// `#[::phoneui_gui::linkme::distributed_slice]` static that adds it to
/// `BACKEND_MODULES` under the given library name.
pub fn backend(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as BackendArgs);
    let func = parse_macro_input!(item as ItemFn);

    if let Some(input) = func.sig.inputs.first() {
        return syn::Error::new_spanned(input, "backend constructors take no arguments")
            .into_compile_error()
            .into();
    }
    if let Some(asyncness) = &func.sig.asyncness {
        return syn::Error::new_spanned(asyncness, "backend constructors cannot be async")
            .into_compile_error()
            .into();
    }
    if args.library.value().is_empty() {
        return syn::Error::new(args.library.span(), "library name must not be empty")
            .into_compile_error()
            .into();
    }

    let fn_name = &func.sig.ident;
    let fn_name_upper = fn_name.to_string().to_uppercase();
    let static_name = Ident::new(
        &format!("_BACKEND_REGISTER_{fn_name_upper}"),
        Span::call_site(),
    );
    let library = &args.library;

    quote! {
        #func

        #[::phoneui_gui::linkme::distributed_slice(::phoneui_gui::BACKEND_MODULES)]
        #[linkme(crate = ::phoneui_gui::linkme)]
        static #static_name: ::phoneui_gui::BackendDecl = ::phoneui_gui::BackendDecl {
            library: #library,
            open: #fn_name,
        };
    }
    .into()
}
