use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, ItemFn, Pat, PathArguments,
    Signature, Type,
};

/// Transform an asynchronous test into a synchronous one, give it a fresh
/// in-memory store behind a running server, and inject dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// `crate::service::ElectionService`, `crate::repository::ElectionRepository`
/// and `std::sync::Arc<crate::model::store::MemoryStore>`, all sharing the same
/// store. Each may be requested at most once, in any order.
#[proc_macro_attribute]
pub fn backend_test(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (
                rocket::local::asynchronous::Client,
                std::sync::Arc<crate::model::store::MemoryStore>,
            ) {
                log4rs_test_utils::test_logging::init_logging_once_for(
                    ["elections_backend"],
                    None,
                    None,
                );
                let store = std::sync::Arc::new(crate::model::store::MemoryStore::new());
                let rocket_client =
                    rocket::local::asynchronous::Client::tracked(crate::build_with_store(store.clone()))
                        .await
                        .unwrap();
                (rocket_client, store)
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let (rocket_client, store) = setup().await;
                let service = rocket_client
                    .rocket()
                    .state::<crate::service::ElectionService>()
                    .unwrap()
                    .clone();
                let repository = service.repository().clone();

                #new_name(#(#test_args),*).await;

                // Not every test asks for everything.
                let _ = (service, repository, store);
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, map each parameter to what it is injected
/// with, and reject unknown or repeated parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut seen: Vec<&'static str> = vec![];
    let mut args = vec![];

    for input in &sig.inputs {
        let injected = injection_for(input);
        match injected {
            Some((kind, tokens)) => {
                if seen.contains(&kind) {
                    return Err(syn::Error::new(
                        input.span(),
                        format!("Test cannot accept more than one `{kind}`"),
                    ));
                }
                seen.push(kind);
                args.push(tokens);
            }
            None => {
                return Err(syn::Error::new(
                    input.span(),
                    "Expected one of `_: Client`, `_: ElectionService`, `_: ElectionRepository` or `_: Arc<MemoryStore>`",
                ));
            }
        }
    }

    Ok(args)
}

/// What a single parameter is injected with, named by the type it asks for.
fn injection_for(input: &FnArg) -> Option<(&'static str, TokenStream2)> {
    let pat_type = match input {
        FnArg::Typed(pat_type) => pat_type,
        FnArg::Receiver(_) => return None,
    };
    if !matches!(&*pat_type.pat, Pat::Ident(_)) {
        return None;
    }
    let type_path = match &*pat_type.ty {
        Type::Path(type_path) => type_path,
        _ => return None,
    };
    // Valid as the last path segment for any type is itself.
    let last = type_path.path.segments.last()?;

    if last.ident == "Client" {
        return Some(("Client", quote! { rocket_client }));
    }
    if last.ident == "ElectionService" {
        return Some(("ElectionService", quote! { service.clone() }));
    }
    if last.ident == "ElectionRepository" {
        return Some(("ElectionRepository", quote! { repository.clone() }));
    }
    if last.ident == "Arc" {
        if let PathArguments::AngleBracketed(generics) = &last.arguments {
            if let Some(GenericArgument::Type(Type::Path(inner))) = generics.args.first() {
                if inner.path.segments.last()?.ident == "MemoryStore" {
                    return Some(("Arc<MemoryStore>", quote! { store.clone() }));
                }
            }
        }
    }
    None
}
