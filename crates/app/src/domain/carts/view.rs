//! Cart read model

use rustc_hash::FxHashMap;

use crate::domain::{
    carts::records::{CartLineRecord, CartRecord, CartUuid},
    products::records::{ProductRecord, ProductUuid},
};

/// A cart with its lines resolved to full product details.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub uuid: CartUuid,
    pub full_name: String,
    pub products: Vec<CartViewLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartViewLine {
    pub product: ProductRecord,
    pub quantity: u32,
}

impl CartView {
    /// Join `lines` with `products`, keeping line order. A cart holds at most
    /// one line per product.
    ///
    /// # Errors
    ///
    /// Returns the uuid of the first line whose product is missing from
    /// `products`.
    pub(crate) fn assemble(
        cart: CartRecord,
        lines: Vec<CartLineRecord>,
        products: Vec<ProductRecord>,
    ) -> Result<Self, ProductUuid> {
        let mut by_uuid: FxHashMap<ProductUuid, ProductRecord> = products
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        let products = lines
            .into_iter()
            .map(|line| {
                let product = by_uuid
                    .remove(&line.product_uuid)
                    .ok_or(line.product_uuid)?;

                Ok(CartViewLine {
                    product,
                    quantity: line.quantity,
                })
            })
            .collect::<Result<Vec<_>, ProductUuid>>()?;

        Ok(Self {
            uuid: cart.uuid,
            full_name: cart.full_name,
            products,
        })
    }
}
