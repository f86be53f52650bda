use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use ff_common::Cents;
use foodflow_engine::db_types::{OrderStatus, Role, UserId};
use foodflow_server::{
    auth::JwtClaims,
    data_objects::{CheckoutResponse, NewOrderRequest, PaymentVerificationRequest, RoleUpdateRequest},
};
use futures::StreamExt;
use jwt_compact::UntrustedToken;
use log::{debug, warn};

mod cart;
mod client;
mod formatting;
mod profile_manager;

use cart::{Cart, CartError, CartIdentity, CartLine, CartStore};
use client::StorefrontClient;
use formatting::{format_cart, format_menu, format_order, format_orders};
use profile_manager::{load_profile, save_profile, Profile};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Command-line storefront for the FoodFlow ordering platform")]
pub struct Arguments {
    /// The profile to use, from ~/.foodtools/config.toml
    #[arg(short, long)]
    profile: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Checks that the server is up
    Health,
    /// Creates a new account on the server
    Register(RegisterParams),
    /// Logs in and stores the access token in the profile. Any guest cart is handed over to the account.
    Login(LoginParams),
    /// Prints a restaurant's menu
    Menu {
        /// The restaurant id
        restaurant: i64,
    },
    /// Manages the local cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Places the order in the cart
    Checkout(CheckoutParams),
    /// Submits a payment verification for an online order
    Verify(VerifyParams),
    /// Lists your orders
    Orders,
    /// Prints a single order
    Order {
        /// The order id
        id: i64,
    },
    /// Advances an order's status (restaurant owners and admins only)
    Status {
        /// The order id
        id: i64,
        /// The new status (Placed, Accepted, Preparing, OutForDelivery, Delivered, Cancelled)
        status: OrderStatus,
    },
    /// Follows live order status updates for your account
    Watch,
    /// Grants or revokes roles on an account (admins only)
    Roles(RolesParams),
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Adds an item to the cart
    Add(CartAddParams),
    /// Removes an item from the cart
    Remove {
        /// The menu item id
        item: i64,
    },
    /// Sets the quantity of an item already in the cart. Zero removes it.
    SetQty {
        /// The menu item id
        item: i64,
        quantity: i64,
    },
    /// Prints the cart
    Show,
    /// Empties the cart
    Clear,
}

#[derive(Debug, Args)]
pub struct RegisterParams {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    email: String,
    #[arg(short, long)]
    password: String,
}

#[derive(Debug, Args)]
pub struct LoginParams {
    #[arg(short, long)]
    email: String,
    #[arg(short, long)]
    password: String,
}

#[derive(Debug, Args)]
pub struct CartAddParams {
    /// The restaurant the item belongs to
    #[arg(short, long)]
    restaurant: i64,
    /// The menu item id
    #[arg(short, long)]
    item: i64,
    #[arg(short, long, default_value = "1")]
    quantity: i64,
    /// The item name. Looked up on the server when omitted (requires login).
    #[arg(long)]
    name: Option<String>,
    /// The item price in major units, e.g. 12.50. Looked up on the server when omitted (requires login).
    #[arg(long)]
    price: Option<f64>,
}

#[derive(Debug, Args)]
pub struct CheckoutParams {
    /// The delivery address
    #[arg(short, long)]
    address: String,
    /// The payment method: cod or online
    #[arg(short, long, default_value = "cod")]
    method: String,
}

#[derive(Debug, Args)]
pub struct VerifyParams {
    /// The provider's order id, as returned at checkout
    #[arg(short, long)]
    order: String,
    /// The provider's payment id
    #[arg(short, long)]
    payment: String,
    /// The payment signature
    #[arg(short, long)]
    signature: String,
}

#[derive(Debug, Args)]
pub struct RolesParams {
    #[arg(short, long)]
    email: String,
    /// Roles to grant
    #[arg(short, long)]
    apply: Vec<Role>,
    /// Roles to revoke
    #[arg(short = 'r', long)]
    revoke: Vec<Role>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();
    let cli = Arguments::parse();
    let profile = load_profile(cli.profile.as_deref())?;
    match cli.command {
        Command::Health => health(profile).await,
        Command::Register(params) => register(profile, params).await,
        Command::Login(params) => login(profile, params).await,
        Command::Menu { restaurant } => menu(profile, restaurant).await,
        Command::Cart(command) => handle_cart(profile, command).await,
        Command::Checkout(params) => checkout(profile, params).await,
        Command::Verify(params) => verify(profile, params).await,
        Command::Orders => my_orders(profile).await,
        Command::Order { id } => fetch_order(profile, id).await,
        Command::Status { id, status } => update_status(profile, id, status).await,
        Command::Watch => watch(profile).await,
        Command::Roles(params) => update_roles(profile, params).await,
    }
}

fn cart_identity(profile: &Profile) -> CartIdentity {
    match profile.user_id {
        Some(id) if profile.access_token.is_some() => CartIdentity::User(UserId(id)),
        _ => CartIdentity::Guest,
    }
}

async fn health(profile: Profile) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let response = client.health().await?;
    print!("{} says: {response}", client.server());
    Ok(())
}

async fn register(profile: Profile, params: RegisterParams) -> Result<()> {
    let client = StorefrontClient::new(profile);
    client.register(params.name, params.email.clone(), params.password).await?;
    println!("Account created for {}. You can log in now.", params.email);
    Ok(())
}

async fn login(mut profile: Profile, params: LoginParams) -> Result<()> {
    let client = StorefrontClient::new(profile.clone());
    let token = client.login(params.email.clone(), params.password).await?;
    let claims = decode_claims(&token)?;
    profile.email = Some(params.email);
    profile.user_id = Some(claims.user_id.0);
    profile.access_token = Some(token);
    save_profile(profile)?;
    // Hand any guest cart over to the account
    let store = CartStore::new()?;
    let cart = store.adopt_guest_cart(claims.user_id)?;
    println!("Logged in as user {}.", claims.user_id);
    if !cart.is_empty() {
        println!("{}", format_cart(&cart));
    }
    Ok(())
}

/// Pulls the claims out of the token without verifying the signature. The server remains the authority; the
/// client only needs its own user id to key the cart file.
fn decode_claims(token: &str) -> Result<JwtClaims> {
    let untrusted = UntrustedToken::new(token).map_err(|e| anyhow!("The server returned a malformed token. {e}"))?;
    let claims = untrusted
        .deserialize_claims_unchecked::<JwtClaims>()
        .map_err(|e| anyhow!("The server returned a malformed token. {e}"))?;
    Ok(claims.custom)
}

async fn menu(profile: Profile, restaurant: i64) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let menu = client.menu(restaurant).await?;
    println!("{}", format_menu(restaurant, &menu));
    Ok(())
}

async fn handle_cart(profile: Profile, command: CartCommand) -> Result<()> {
    let store = CartStore::new()?;
    let identity = cart_identity(&profile);
    let mut cart = store.load(identity)?;
    match command {
        CartCommand::Add(params) => {
            let line = resolve_line(&profile, &params).await?;
            match cart.add_item(params.restaurant, line.clone()) {
                Ok(()) => {},
                Err(CartError::RestaurantConflict { current, incoming }) => {
                    let replace = Confirm::new()
                        .with_prompt(format!(
                            "Your cart holds items from restaurant #{current}. Replace it and start a new cart for \
                             #{incoming}?"
                        ))
                        .default(false)
                        .interact()?;
                    if !replace {
                        println!("Cart left unchanged.");
                        return Ok(());
                    }
                    cart.replace_with(params.restaurant, line);
                },
                Err(e) => return Err(e.into()),
            }
            store.save(identity, &cart)?;
            println!("{}", format_cart(&cart));
        },
        CartCommand::Remove { item } => {
            cart.remove_item(item);
            store.save(identity, &cart)?;
            println!("{}", format_cart(&cart));
        },
        CartCommand::SetQty { item, quantity } => {
            cart.set_quantity(item, quantity);
            store.save(identity, &cart)?;
            println!("{}", format_cart(&cart));
        },
        CartCommand::Show => println!("{}", format_cart(&cart)),
        CartCommand::Clear => {
            store.purge(identity)?;
            println!("Cart emptied.");
        },
    }
    Ok(())
}

/// Builds the cart line for an add. Name and price come from the command line when given, otherwise from the
/// restaurant's menu, which needs a logged-in session.
async fn resolve_line(profile: &Profile, params: &CartAddParams) -> Result<CartLine> {
    if let (Some(name), Some(price)) = (&params.name, params.price) {
        return Ok(CartLine {
            menu_item_id: params.item,
            name: name.clone(),
            unit_price: Cents::from_decimal(price),
            quantity: params.quantity,
        });
    }
    let client = StorefrontClient::new(profile.clone());
    let menu = client.menu(params.restaurant).await.map_err(|e| {
        anyhow!("Could not look the item up on the server ({e}). Pass --name and --price to add it offline.")
    })?;
    let item = menu
        .iter()
        .find(|i| i.id == params.item)
        .ok_or_else(|| anyhow!("Restaurant #{} has no menu item #{}", params.restaurant, params.item))?;
    if !item.available {
        warn!("🛒️ {} is currently marked unavailable. The server will reject a checkout containing it.", item.name);
    }
    Ok(CartLine {
        menu_item_id: item.id,
        name: item.name.clone(),
        unit_price: item.price,
        quantity: params.quantity,
    })
}

async fn checkout(profile: Profile, params: CheckoutParams) -> Result<()> {
    let store = CartStore::new()?;
    let identity = cart_identity(&profile);
    let cart = store.load(identity)?;
    let restaurant = match (cart.is_empty(), cart.restaurant) {
        (false, Some(r)) => r,
        _ => return Err(anyhow!("The cart is empty. Add something first.")),
    };
    let order = NewOrderRequest {
        restaurant,
        items: cart.as_line_items(),
        total_amount: cart.total().to_decimal(),
        delivery_address: params.address,
        payment_method: params.method.parse().map_err(|e| anyhow!("{e}"))?,
    };
    let client = StorefrontClient::new(profile);
    let response = client.checkout(&order).await?;
    store.purge(identity)?;
    match response {
        CheckoutResponse::Cod { order } => {
            println!("Order placed. Pay on delivery.");
            println!("{}", format_order(&order)?);
        },
        CheckoutResponse::Online { order, provider_order, key_id } => {
            println!("Order placed. Complete the payment to confirm it.");
            println!("{}", format_order(&order)?);
            println!("Provider order id: {}", provider_order.id);
            println!("Amount due: {}", provider_order.amount_due);
            println!("Key id: {key_id}");
            println!("Run `foodtools verify` with the payment id and signature once the payment goes through.");
        },
    }
    Ok(())
}

async fn verify(profile: Profile, params: VerifyParams) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let verification = PaymentVerificationRequest {
        provider_order_id: params.order,
        provider_payment_id: params.payment,
        signature: params.signature,
    };
    let response = client.verify_payment(&verification).await?;
    println!("{}", response.message);
    Ok(())
}

async fn my_orders(profile: Profile) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let orders = client.my_orders().await?;
    println!("{}", format_orders(&orders));
    Ok(())
}

async fn fetch_order(profile: Profile, id: i64) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let order = client.order(id).await?;
    println!("{}", format_order(&order)?);
    Ok(())
}

async fn update_status(profile: Profile, id: i64, status: OrderStatus) -> Result<()> {
    let client = StorefrontClient::new(profile);
    client.update_status(id, status).await?;
    println!("Order #{id} is now {status}.");
    Ok(())
}

async fn update_roles(profile: Profile, params: RolesParams) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let update = RoleUpdateRequest { email: params.email.clone(), apply: params.apply, revoke: params.revoke };
    let response = client.update_roles(&[update]).await?;
    println!("{}", response.message);
    Ok(())
}

/// Tails the server's order status stream. The full order list is fetched once the stream is open, so anything
/// that changed while offline is shown up front. After that, each event names the order and its new status and the
/// full order is re-fetched, so the display never depends on the stream alone.
async fn watch(profile: Profile) -> Result<()> {
    let client = StorefrontClient::new(profile);
    let response = client.order_events().await?;
    let orders = client.my_orders().await?;
    println!("{}", format_orders(&orders));
    println!("Watching order updates for your account. Ctrl-C to stop.");
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(boundary) = buffer.find("\n\n") {
            let frame = buffer[..boundary].to_string();
            buffer.drain(..boundary + 2);
            if let Some(order_id) = parse_status_frame(&frame) {
                match client.order(order_id).await {
                    Ok(order) => println!("{}", format_order(&order)?),
                    Err(e) => warn!("Order #{order_id} changed, but fetching it failed. {e}"),
                }
            }
        }
    }
    println!("The server closed the stream.");
    Ok(())
}

fn parse_status_frame(frame: &str) -> Option<i64> {
    let mut is_status_event = false;
    let mut order_id = None;
    for line in frame.lines() {
        if let Some(event) = line.strip_prefix("event: ") {
            is_status_event = event.trim() == "orderStatusUpdated";
        } else if let Some(data) = line.strip_prefix("data: ") {
            match serde_json::from_str::<serde_json::Value>(data) {
                Ok(value) => order_id = value["orderId"].as_i64(),
                Err(e) => debug!("Skipping an unparseable event frame. {e}"),
            }
        }
    }
    if is_status_event {
        order_id
    } else {
        None
    }
}
