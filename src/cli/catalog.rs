use comfy_table::Cell;

use crate::api::{images, servers, ApiError};
use crate::forms::{validate_image, validate_server, FormErrors, ImageInput, ServerInput};
use crate::models::{Image, Server};
use crate::utils::{new_table, or_dash};

use super::{success, CliContext, CliError};

fn submit_error(ctx: &CliContext, e: ApiError) -> CliError {
    if e.is_unauthorized() {
        return ctx.observe::<()>(Err(e)).err().unwrap_or(CliError::NotLoggedIn);
    }
    CliError::from_form(&FormErrors::from_api_error(&e))
}

pub fn images_table(list: &[Image]) -> comfy_table::Table {
    let mut table = new_table(&["ID", "Name", "Registry Path", "CUDA", "OS", "Arch", "Available"]);
    for img in list {
        let os = match (img.os_name.as_deref(), img.os_version.as_deref()) {
            (Some(name), Some(version)) if !version.is_empty() => format!("{} {}", name, version),
            (name, _) => or_dash(name),
        };
        table.add_row(vec![
            Cell::new(&img.id),
            Cell::new(&img.name),
            Cell::new(or_dash(Some(&img.tag))),
            Cell::new(or_dash(img.cuda_version.as_deref())),
            Cell::new(os),
            Cell::new(or_dash(img.architecture.as_deref())),
            Cell::new(if img.is_available { "yes" } else { "no" }),
        ]);
    }
    table
}

pub async fn images_list(ctx: &CliContext) -> Result<(), CliError> {
    let result = images::list_images(&ctx.api).await;
    let list = ctx.observe(result)?;
    if list.is_empty() {
        println!("No images found.");
    } else {
        println!("{}", images_table(&list));
    }
    Ok(())
}

pub async fn images_create(ctx: &CliContext, input: ImageInput) -> Result<(), CliError> {
    let image = validate_image(&input).map_err(|e| CliError::from_form(&e))?;
    images::create_image(&ctx.api, &image)
        .await
        .map_err(|e| submit_error(ctx, e))?;
    success(format!("Image definition \"{}\" created successfully.", image.name));
    Ok(())
}

pub fn servers_table(list: &[Server]) -> comfy_table::Table {
    let mut table = new_table(&["ID", "Hostname", "IP Address", "Status"]);
    for server in list {
        table.add_row(vec![
            Cell::new(&server.id),
            Cell::new(&server.hostname),
            Cell::new(or_dash(server.ip_address.as_deref())),
            Cell::new(if server.is_active { "active" } else { "inactive" }),
        ]);
    }
    table
}

pub async fn servers_list(ctx: &CliContext) -> Result<(), CliError> {
    ctx.require_staff().await?;
    let result = servers::list_servers(&ctx.api).await;
    let list = ctx.observe(result)?;
    if list.is_empty() {
        println!("No servers found.");
    } else {
        println!("{}", servers_table(&list));
    }
    Ok(())
}

pub async fn servers_create(ctx: &CliContext, input: ServerInput) -> Result<(), CliError> {
    ctx.require_staff().await?;
    let server = validate_server(&input).map_err(|e| CliError::from_form(&e))?;
    servers::create_server(&ctx.api, &server)
        .await
        .map_err(|e| submit_error(ctx, e))?;
    success(format!("Server {} created successfully.", server.hostname));
    Ok(())
}
