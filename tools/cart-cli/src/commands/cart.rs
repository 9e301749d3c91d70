//! Cart commands.

use anyhow::Result;
use turbo_cart::{Cart, CartStore, NewItem, Price, ProductId};

use super::{AddArgs, IdArgs};
use crate::context::Context;

/// Run the add command.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let price = Price::new(args.price)?;
    let candidate = NewItem::new(args.id, args.title, args.image_url, price);
    let title = candidate.title.clone();

    let store = ctx.open_store().await?;
    store.add_to_cart(candidate)?;
    ctx.output.success(&format!("Added {}", title));

    finish(store, ctx).await
}

/// Run the inc command.
pub async fn increment(args: IdArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    let store = ctx.open_store().await?;

    if !store.products()?.contains(&id) {
        notify(Notice::NotInCart, &id, ctx);
    }
    store.increment(&id)?;

    finish(store, ctx).await
}

/// Run the dec command.
pub async fn decrement(args: IdArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    let store = ctx.open_store().await?;

    if let Some(notice) = decrement_notice(&store.products()?, &id) {
        notify(notice, &id, ctx);
    }
    store.decrement(&id)?;

    finish(store, ctx).await
}

/// Run the list command.
pub async fn list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    ctx.output.header("Cart");
    ctx.output.cart(&store.products()?);
    Ok(())
}

/// Something worth telling the user before a quantity change.
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    NotInCart,
    Removed,
}

/// What `dec` will do to `id` beyond lowering its quantity.
fn decrement_notice(cart: &Cart, id: &ProductId) -> Option<Notice> {
    match cart.get(id).map(|item| item.quantity()) {
        None => Some(Notice::NotInCart),
        Some(1) => Some(Notice::Removed),
        Some(_) => None,
    }
}

fn notify(notice: Notice, id: &ProductId, ctx: &Context) {
    match notice {
        Notice::NotInCart => ctx.output.warn(&format!("{} is not in the cart", id)),
        Notice::Removed => ctx.output.success(&format!("Removed {}", id)),
    }
}

/// Persist outstanding writes and print the resulting cart.
async fn finish(store: CartStore, ctx: &Context) -> Result<()> {
    store.shutdown().await?;
    ctx.output.cart(&store.products()?);
    Ok(())
}
