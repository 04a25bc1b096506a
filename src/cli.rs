use crate::{
    error::{ErrorKind, ShopError},
    models::{CartItem, Product},
    shop::Shop,
    views::{
        self,
        cart as cart_view, catalog, checkout as checkout_view,
        forms::{self, CheckoutForm, LoginForm, RegisterForm},
        nav, Notice, View,
    },
};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::rc::Rc;

pub struct Context {
    pub backend_url: String,
    pub shop: RefCell<Shop>,
    /// Last product listing, so products can be referred to by position
    pub catalog: RefCell<Vec<Product>>,
    pub view: RefCell<View>,
}

/// Views re-render on store notifications: sign-in changes and cart badge
/// changes are announced as they happen.
fn subscribe_views(ctx: &Context) {
    let mut shop = ctx.shop.borrow_mut();

    let last_user = Rc::new(RefCell::new(None::<String>));
    shop.session_mut().subscribe(move |session| {
        let current = session.user().map(|u| u.id.clone());
        let mut last = last_user.borrow_mut();
        if *last == current {
            return;
        }
        match session.user() {
            Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
            None if last.is_some() => println!("Signed out"),
            None => {}
        }
        *last = current;
    });

    let last_count = Rc::new(RefCell::new(0u64));
    shop.cart_mut().subscribe(move |cart| {
        let count = cart.item_count();
        let mut last = last_count.borrow_mut();
        if *last != count {
            println!("[{}]", nav::cart_badge(cart));
            *last = count;
        }
    });
}

fn start(ctx: &Context) {
    subscribe_views(ctx);
    ctx.shop.borrow_mut().start();
}

pub fn run_once(ctx: &Context, command: &str) -> Result<()> {
    start(ctx);
    handle_command(ctx, command.trim(), None);
    Ok(())
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("shopfront - type /help for commands, /exit to quit");
    start(&ctx);
    {
        let shop = ctx.shop.borrow();
        println!(
            "{}",
            nav::render_navbar(shop.session().user(), shop.cart().cart())
        );
    }

    loop {
        let prompt = {
            let shop = ctx.shop.borrow();
            nav::prompt(shop.session().user(), shop.cart().cart())
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                if handle_command(&ctx, line, Some(&mut rl)) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn notify(notice: Notice) {
    println!("{}", notice.render());
}

/// Cart failures show a fixed message; auth failures also say how to recover
fn report(err: &ShopError, message: &str) {
    tracing::debug!(error = %err, "{}", message);
    notify(Notice::Error(message.to_string()));
    if err.kind() == ErrorKind::Auth {
        println!("Your session may have expired. Sign in again with /login.");
    }
}

/// Returns true when the REPL should exit
fn handle_command(ctx: &Context, line: &str, rl: Option<&mut DefaultEditor>) -> bool {
    let words = match shell_words::split(line) {
        Ok(words) => words,
        Err(e) => {
            println!("Could not parse command: {}", e);
            return false;
        }
    };
    let Some((cmd, rest)) = words.split_first() else {
        return false;
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match cmd.as_str() {
        "/exit" | "/quit" => return true,
        "/help" => print_help(),
        "/session" => handle_session(ctx),
        "/products" | "/" => handle_products(ctx),
        "/show" => handle_show(ctx, &args),
        "/add" => handle_add(ctx, &args),
        "/cart" => handle_cart(ctx),
        "/refresh" => handle_refresh(ctx),
        "/inc" => handle_step(ctx, &args, true),
        "/dec" => handle_step(ctx, &args, false),
        "/qty" => handle_qty(ctx, &args),
        "/rm" => handle_remove(ctx, &args),
        "/checkout" => handle_checkout(ctx),
        "/place" => handle_place(ctx, &args),
        "/login" => handle_login(ctx, &args, rl),
        "/register" => handle_register(ctx, &args, rl),
        "/logout" => {
            ctx.shop.borrow_mut().logout();
            notify(Notice::success("Logged out"));
        }
        other if other.starts_with('/') => println!("Unknown command: {}", other),
        _ => println!("Commands start with '/'. Type /help for the list."),
    }
    false
}

fn print_help() {
    println!("Commands:");
    println!("  /exit                      - quit");
    println!("  /help                      - show commands");
    println!("  /session                   - show backend and sign-in info");
    println!("Account:");
    println!("  /login <email> [password]  - sign in");
    println!("  /register <name> <email> [password] - create an account");
    println!("  /logout                    - sign out");
    println!("Shopping:");
    println!("  /products                  - list products");
    println!("  /show <n|id>               - product details");
    println!("  /add <n|id> [qty]          - add a product to the cart");
    println!("  /cart                      - show the cart");
    println!("  /refresh                   - reload the cart from the server");
    println!("  /inc <line> | /dec <line>  - change a line's quantity by one");
    println!("  /qty <line> <n>            - set a line's quantity");
    println!("  /rm <line>                 - remove a line");
    println!("Checkout:");
    println!("  /checkout                  - review the order");
    println!("  /place [name] [email]      - place the order");
}

/// Applies the route guards; prints the redirect target's hint if moved
fn guard(ctx: &Context, requested: View) -> View {
    let shop = ctx.shop.borrow();
    let landed = views::navigate(requested, shop.session(), shop.cart().cart());
    *ctx.view.borrow_mut() = landed;
    if landed != requested {
        match landed {
            View::Loading => println!("Loading..."),
            View::Login => println!("Please sign in first: /login <email> [password]"),
            View::Cart => println!("{}", cart_view::render_cart(shop.cart().cart())),
            _ => {}
        }
    }
    landed
}

fn handle_session(ctx: &Context) {
    let shop = ctx.shop.borrow();
    println!("Backend: {}", ctx.backend_url);
    println!("Page:    {}", ctx.view.borrow().path());
    match shop.session().user() {
        Some(user) => println!("Signed in: {} <{}> (id {})", user.name, user.email, user.id),
        None => println!("Signed in: no"),
    }
    let token = if shop.session().session().token().is_some() {
        "held"
    } else {
        "none"
    };
    println!("Token:   {}", token);
    println!("Items:   {}", shop.cart().item_count());
    println!("{}", nav::render_navbar(shop.session().user(), shop.cart().cart()));
}

fn load_products(ctx: &Context) -> bool {
    let result = ctx.shop.borrow().products();
    match result {
        Ok(products) => {
            *ctx.catalog.borrow_mut() = products;
            true
        }
        Err(e) => {
            notify(Notice::failure(&e, "Failed to load products"));
            false
        }
    }
}

fn handle_products(ctx: &Context) {
    if guard(ctx, View::Products) != View::Products {
        return;
    }
    if load_products(ctx) {
        println!("{}", catalog::render_products(&ctx.catalog.borrow()));
    }
}

fn resolve_product_id(ctx: &Context, selector: &str) -> Option<String> {
    if ctx.catalog.borrow().is_empty() && !load_products(ctx) {
        return None;
    }
    let found = catalog::select(&ctx.catalog.borrow(), selector).map(|p| p.id.clone());
    if found.is_none() {
        println!("No product '{}'. Use /products to list them.", selector);
    }
    found
}

fn handle_show(ctx: &Context, args: &[&str]) {
    let Some(selector) = args.first() else {
        println!("Usage: /show <n|id>");
        return;
    };
    if guard(ctx, View::Products) != View::Products {
        return;
    }
    let id = catalog::select(&ctx.catalog.borrow(), selector)
        .map(|p| p.id.clone())
        .unwrap_or_else(|| selector.to_string());
    let result = ctx.shop.borrow().product(&id);
    match result {
        Ok(product) => println!("{}", catalog::render_product(&product)),
        Err(e) => notify(Notice::failure(&e, "Failed to load product")),
    }
}

fn parse_quantity(raw: Option<&&str>) -> Option<u32> {
    let Some(raw) = raw else {
        return Some(1);
    };
    match cart_view::parse_quantity(raw) {
        Ok(q) => Some(q),
        Err(message) => {
            println!("{}", message);
            None
        }
    }
}

fn handle_add(ctx: &Context, args: &[&str]) {
    let Some(selector) = args.first() else {
        println!("Usage: /add <n|id> [qty]");
        return;
    };
    if guard(ctx, View::Products) != View::Products {
        return;
    }
    let Some(quantity) = parse_quantity(args.get(1)) else {
        return;
    };
    let Some(product_id) = resolve_product_id(ctx, selector) else {
        return;
    };

    let result = ctx.shop.borrow_mut().add_to_cart(&product_id, quantity);
    match result {
        Ok(()) => notify(Notice::success("Added to cart!")),
        Err(e) => report(&e, "Failed to add to cart"),
    }
}

fn handle_cart(ctx: &Context) {
    if guard(ctx, View::Cart) != View::Cart {
        return;
    }
    let shop = ctx.shop.borrow();
    println!("{}", cart_view::render_cart(shop.cart().cart()));
}

fn handle_refresh(ctx: &Context) {
    if guard(ctx, View::Cart) != View::Cart {
        return;
    }
    let result = ctx.shop.borrow_mut().refresh_cart();
    match result {
        Ok(()) => {
            let shop = ctx.shop.borrow();
            println!("{}", cart_view::render_cart(shop.cart().cart()));
        }
        Err(e) => report(&e, "Failed to load cart"),
    }
}

fn resolve_line(ctx: &Context, selector: Option<&&str>, usage: &str) -> Option<CartItem> {
    let Some(selector) = selector else {
        println!("Usage: {}", usage);
        return None;
    };
    if guard(ctx, View::Cart) != View::Cart {
        return None;
    }
    let shop = ctx.shop.borrow();
    let found = cart_view::select(shop.cart().cart(), selector).cloned();
    if found.is_none() {
        println!("No cart line '{}'. Use /cart to list them.", selector);
    }
    found
}

fn update_quantity(ctx: &Context, item_id: &str, quantity: u32) {
    let result = ctx.shop.borrow_mut().update_quantity(item_id, quantity);
    match result {
        Ok(()) => {
            let shop = ctx.shop.borrow();
            println!("{}", cart_view::render_cart(shop.cart().cart()));
        }
        Err(e) => report(&e, "Failed to update cart"),
    }
}

fn handle_step(ctx: &Context, args: &[&str], up: bool) {
    let usage = if up { "/inc <line>" } else { "/dec <line>" };
    let Some(item) = resolve_line(ctx, args.first(), usage) else {
        return;
    };
    let next = if up {
        cart_view::incremented(&item)
    } else {
        cart_view::decremented(&item)
    };
    match next {
        Some(q) => update_quantity(ctx, &item.id, q),
        None if up => println!("Quantity cannot go above {}", cart_view::MAX_QUANTITY),
        None => println!("Quantity cannot go below 1; use /rm to remove the line"),
    }
}

fn handle_qty(ctx: &Context, args: &[&str]) {
    if args.len() < 2 {
        println!("Usage: /qty <line> <n>");
        return;
    }
    let Some(item) = resolve_line(ctx, args.first(), "/qty <line> <n>") else {
        return;
    };
    if let Some(quantity) = parse_quantity(args.get(1)) {
        update_quantity(ctx, &item.id, quantity);
    }
}

fn handle_remove(ctx: &Context, args: &[&str]) {
    let Some(item) = resolve_line(ctx, args.first(), "/rm <line>") else {
        return;
    };
    let result = ctx.shop.borrow_mut().remove_item(&item.id);
    match result {
        Ok(()) => notify(Notice::success("Removed from cart")),
        Err(e) => report(&e, "Failed to remove from cart"),
    }
}

fn checkout_form(ctx: &Context, args: &[&str]) -> CheckoutForm {
    let shop = ctx.shop.borrow();
    let mut form = CheckoutForm::prefilled(shop.session().user());
    if let Some(name) = args.first() {
        form.name = name.to_string();
    }
    if let Some(email) = args.get(1) {
        form.email = email.to_string();
    }
    form
}

fn handle_checkout(ctx: &Context) {
    if guard(ctx, View::Checkout) != View::Checkout {
        return;
    }
    let form = checkout_form(ctx, &[]);
    let shop = ctx.shop.borrow();
    println!("{}", checkout_view::render_summary(shop.cart().cart(), &form));
    println!("\nUse /place to place the order, or /place \"<name>\" <email> to change the details.");
}

fn handle_place(ctx: &Context, args: &[&str]) {
    if guard(ctx, View::Checkout) != View::Checkout {
        return;
    }
    let form = checkout_form(ctx, args);
    let result = ctx.shop.borrow_mut().place_order(&form);
    match result {
        Ok(receipt) => {
            notify(Notice::success("Order placed successfully!"));
            println!("{}", checkout_view::render_receipt(&receipt));
        }
        Err(e) => notify(Notice::failure(&e, "Checkout failed")),
    }
}

fn read_password(rl: Option<&mut DefaultEditor>) -> Option<String> {
    let rl = rl?;
    match rl.readline("Password: ") {
        Ok(line) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(_) => None,
    }
}

fn handle_login(ctx: &Context, args: &[&str], rl: Option<&mut DefaultEditor>) {
    let Some(email) = args.first() else {
        println!("Usage: /login <email> [password]");
        return;
    };
    guard(ctx, View::Login);
    let password = match args.get(1) {
        Some(p) => p.to_string(),
        None => read_password(rl).unwrap_or_default(),
    };
    let form = LoginForm {
        email: email.to_string(),
        password,
    };
    if let Err(errors) = form.validate() {
        notify(Notice::Error(forms::describe(&errors)));
        return;
    }

    let result = ctx
        .shop
        .borrow_mut()
        .login(form.email.trim(), &form.password);
    match result {
        Ok(_) => {
            notify(Notice::success("Welcome back!"));
            handle_products(ctx);
        }
        Err(e) => notify(Notice::failure(&e, "Login failed")),
    }
}

fn handle_register(ctx: &Context, args: &[&str], rl: Option<&mut DefaultEditor>) {
    if args.len() < 2 {
        println!("Usage: /register <name> <email> [password]");
        return;
    }
    guard(ctx, View::Register);
    let password = match args.get(2) {
        Some(p) => p.to_string(),
        None => read_password(rl).unwrap_or_default(),
    };
    let form = RegisterForm {
        name: args[0].to_string(),
        email: args[1].to_string(),
        password,
    };
    if let Err(errors) = form.validate() {
        notify(Notice::Error(forms::describe(&errors)));
        return;
    }

    let result = ctx.shop.borrow_mut().register(
        form.email.trim(),
        &form.password,
        form.name.trim(),
    );
    match result {
        Ok(_) => {
            notify(Notice::success("Account created successfully!"));
            handle_products(ctx);
        }
        Err(e) => notify(Notice::failure(&e, "Registration failed")),
    }
}
