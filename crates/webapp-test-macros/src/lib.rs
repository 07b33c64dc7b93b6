use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as Tokens};
use quote::quote;
use syn::{
    meta::{self, ParseNestedMeta},
    parse::{Error as ParseError, Parser},
    parse_macro_input, Ident, ItemFn, LitStr, ReturnType, Token,
};

/// Group of the tests that must not run in parallel.
#[derive(Debug)]
enum Serial {
    /// `serial`, excluded from all the other serial tests
    Any,
    /// `serial = "key"`, excluded from the tests sharing the key
    Key(Ident),
}

#[derive(Default, Debug)]
struct TestAttributes {
    serial: Option<Serial>,
    skip: Option<Option<LitStr>>,
}

fn parse_optional_str(meta: &ParseNestedMeta) -> Result<Option<LitStr>, ParseError> {
    if meta.input.peek(Token![=]) {
        Ok(Some(meta.value()?.parse()?))
    } else {
        Ok(None)
    }
}

impl TestAttributes {
    fn parse(input: TokenStream) -> Result<Self, ParseError> {
        let mut attrs = Self::default();

        let parser = meta::parser(|meta| {
            if meta.path.is_ident("serial") {
                if attrs.serial.is_some() {
                    return Err(meta.error("duplicate serial property"));
                }
                attrs.serial = Some(match parse_optional_str(&meta)? {
                    Some(key) => Serial::Key(Ident::new(&key.value(), key.span())),
                    None => Serial::Any,
                });
                Ok(())
            } else if meta.path.is_ident("skip") {
                if attrs.skip.is_some() {
                    return Err(meta.error("duplicate skip property"));
                }
                attrs.skip = Some(parse_optional_str(&meta)?);
                Ok(())
            } else {
                Err(meta.error("unsupported test property, expected `serial` or `skip`"))
            }
        });

        parser.parse(input)?;
        Ok(attrs)
    }

    fn decorations(&self, is_async: bool) -> Vec<Tokens> {
        let mut decors = Vec::new();

        decors.push(if is_async {
            quote! { #[::tokio::test(flavor = "multi_thread")] }
        } else {
            quote! { #[::core::prelude::v1::test] }
        });

        match &self.serial {
            Some(Serial::Any) => decors.push(quote! { #[::serial_test::serial] }),
            Some(Serial::Key(key)) => decors.push(quote! { #[::serial_test::serial(#key)] }),
            None => {}
        }

        match &self.skip {
            Some(Some(reason)) => decors.push(quote! { #[ignore = #reason] }),
            Some(None) => decors.push(quote! { #[ignore] }),
            None => {}
        }

        decors
    }
}

/// Test attribute of the workspace, the tracing subscriber is installed before the body runs.
/// Async functions are run on a multi-threaded tokio runtime. Supported properties:
/// - `serial` or `serial = "key"`: serialized with the other (same keyed) serial tests, the test crate
///   has to depend on `serial_test`. Use it for tests touching the process environment.
/// - `skip` or `skip = "reason"`: ignore the test
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match TestAttributes::parse(attr) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error().into(),
    };
    let input = parse_macro_input!(item as ItemFn);

    if !input.sig.inputs.is_empty() {
        return ParseError::new_spanned(&input.sig.inputs, "test functions take no arguments")
            .to_compile_error()
            .into();
    }

    let decors = attrs.decorations(input.sig.asyncness.is_some());
    expand_wrapper(&decors, &input).into()
}

/// Wrap the test body into an inner function called after the test setup.
fn expand_wrapper(decors: &[Tokens], input: &ItemFn) -> Tokens {
    let ItemFn { attrs, vis, sig, block, .. } = input;
    let async_token = &sig.asyncness;
    let await_token = async_token.map(|_| quote! {.await});
    let test_name = &sig.ident;
    let inner = Ident::new(&format!("{test_name}_body"), Span::call_site());

    // #[should_panic] tests have to return unit
    let ret = match &sig.output {
        ReturnType::Default => quote! {},
        ReturnType::Type(_, ty) => quote! {-> #ty},
    };

    quote! {
        #(#decors)*
        #(#attrs)*
        #vis #async_token fn #test_name() #ret {
            #async_token fn #inner() #ret #block

            ::webapp_test::setup_test();
            #inner()#await_token
        }
    }
}
