use stockroom_core::{ApplicationError, ProductId};
use stockroom_store::open_file;

use crate::commands::{prepare, CommandResult};

pub fn list() -> CommandResult {
    let (config, runtime) = match prepare("list") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let store = runtime.block_on(open_file(config.store.path));
    let products = store.get_products();
    match serde_json::to_value(products) {
        Ok(data) => CommandResult::success_with_data(
            "list",
            format!("{} product(s) in catalog", products.len()),
            Some(data),
        ),
        Err(error) => CommandResult::failure("list", "serialization", error.to_string(), 5),
    }
}

pub fn get(id: u64) -> CommandResult {
    let (config, runtime) = match prepare("get") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let store = runtime.block_on(open_file(config.store.path));
    match store.get_product_by_id(ProductId(id)) {
        Ok(product) => match serde_json::to_value(product) {
            Ok(data) => CommandResult::success_with_data(
                "get",
                format!("product {id} found"),
                Some(data),
            ),
            Err(error) => CommandResult::failure("get", "serialization", error.to_string(), 5),
        },
        Err(missing) => {
            let error = ApplicationError::from(missing);
            CommandResult::failure("get", error.error_class(), error.to_string(), 4)
        }
    }
}
