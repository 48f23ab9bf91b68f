use rust_decimal::Decimal;
use stockroom_core::{DomainError, NewProduct, Product, ProductId, ProductPatch};
use stockroom_store::{open_file, BlobStore, CatalogStore, Committed, Flush};

use crate::commands::{prepare, CommandResult};

/// Walks the configured catalog through every store operation, one line per step.
pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("demo") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let (lines, remaining) = runtime.block_on(async {
        let mut store = open_file(config.store.path).await;
        let lines = walkthrough(&mut store).await;
        (lines, store.get_products().to_vec())
    });

    let data = serde_json::to_value(&remaining).ok();
    CommandResult::success_with_data(
        "demo",
        format!("demo finished with {} product(s) in catalog", remaining.len()),
        data,
    )
    .with_preamble(lines)
}

pub(crate) async fn walkthrough<B: BlobStore>(store: &mut CatalogStore<B>) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("--- adding products ---".to_string());
    for input in [
        item("shirt", "shirt size 4", 3500, "shirt1.jpg", "cod1", 10),
        item("jeans", "denim jeans", 40_000, "jeans1.jpg", "cod2", 5),
        item("tie", "black", 10_000, "tie1.jpg", "cod3", 7),
    ] {
        lines.push(describe_add(store.add_product(input).await));
    }

    lines.push("--- adding a product with a repeated code ---".to_string());
    let repeated = item("checkered shirt", "checkered", 25_000, "shirt2.jpg", "cod2", 5);
    lines.push(describe_add(store.add_product(repeated).await));

    lines.push("--- adding a product with empty fields ---".to_string());
    let incomplete = item("tie", "", 3000, "tie3.jpg", "cod5", 10);
    lines.push(describe_add(store.add_product(incomplete).await));

    lines.push("--- listing products ---".to_string());
    lines.extend(render_all(store.get_products()));

    lines.push("--- lookup by id ---".to_string());
    lines.push(describe_lookup(store.get_product_by_id(ProductId(1))));

    lines.push("--- lookup by unknown id ---".to_string());
    lines.push(describe_lookup(store.get_product_by_id(ProductId(6))));

    lines.push("--- updating a product ---".to_string());
    let patch = ProductPatch {
        title: Some("shirt v2".to_string()),
        description: Some("long sleeves".to_string()),
        price: Some(Decimal::from(500)),
        thumbnail: Some("new_image.jpg".to_string()),
        code: Some("cod1".to_string()),
        stock: Some(8),
    };
    lines.push(describe_change("updated", store.update_product(ProductId(1), patch).await));

    lines.push("--- listing updated products ---".to_string());
    lines.extend(render_all(store.get_products()));

    lines.push("--- deleting a product ---".to_string());
    lines.push(describe_change("deleted", store.delete_product(ProductId(1)).await));

    lines.push("--- listing products after delete ---".to_string());
    lines.extend(render_all(store.get_products()));

    lines
}

fn item(
    title: &str,
    description: &str,
    price: i64,
    thumbnail: &str,
    code: &str,
    stock: i64,
) -> NewProduct {
    NewProduct::new(title, description, Decimal::from(price), thumbnail, code, stock)
}

fn describe_add(outcome: Result<Committed<Product>, DomainError>) -> String {
    match outcome {
        Ok(committed) => with_flush(
            format!("added product `{}` with id {}", committed.value.title, committed.value.id),
            &committed.flush,
        ),
        Err(rejection) => format!("rejected: {rejection}"),
    }
}

fn describe_change(verb: &str, outcome: Result<Committed<Product>, DomainError>) -> String {
    match outcome {
        Ok(committed) => {
            with_flush(format!("{verb} product with id {}", committed.value.id), &committed.flush)
        }
        Err(missing) => format!("skipped: {missing}"),
    }
}

fn describe_lookup(outcome: Result<&Product, DomainError>) -> String {
    match outcome {
        Ok(product) => format!("found: {}", render(product)),
        Err(missing) => format!("lookup failed: {missing}"),
    }
}

fn with_flush(line: String, flush: &Flush) -> String {
    match flush.as_error() {
        None => line,
        Some(failure) => format!("{line} [{}: {failure}]", failure.error_class()),
    }
}

fn render_all(products: &[Product]) -> Vec<String> {
    if products.is_empty() {
        return vec!["(catalog is empty)".to_string()];
    }
    products.iter().map(render).collect()
}

fn render(product: &Product) -> String {
    format!(
        "#{} {} | {} | price {} | {} | code {} | stock {}",
        product.id,
        product.title,
        product.description,
        product.price,
        product.thumbnail,
        product.code,
        product.stock
    )
}
