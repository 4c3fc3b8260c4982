//! Demonstrates recycling mount content across the lifetime of two windows.

use mount_pools::{Context, ContentTypeId, MountContentDefinition, MountContentPools, RootContext};

#[derive(Debug)]
struct TextView {
    buffer: String,
}

struct TextViewDefinition;

impl MountContentDefinition<TextView> for TextViewDefinition {
    fn content_type_id(&self) -> ContentTypeId {
        ContentTypeId::new(1)
    }

    fn pool_capacity(&self) -> usize {
        2
    }

    fn create_mount_content(&self, _context: &Context) -> TextView {
        println!("Constructing a new text view.");

        TextView {
            buffer: String::with_capacity(4096),
        }
    }
}

fn main() {
    let pools = MountContentPools::new();

    let first_window = RootContext::hierarchy();
    let second_window = RootContext::hierarchy();

    let first = Context::wrap(&first_window);
    let second = Context::wrap(&second_window);

    // Construct content for the first window and return it to the pool when unmounted.
    let mut view = pools.acquire_or_create(&first, &TextViewDefinition);
    view.buffer.push_str("hello");
    view.buffer.clear();
    pools.release(&first, &TextViewDefinition, view);

    // The first window gets its view back, the second window has to construct its own.
    let reused = pools.acquire_or_create(&first, &TextViewDefinition);
    let fresh = pools.acquire_or_create(&second, &TextViewDefinition);
    println!("Reused view has {} bytes of capacity.", reused.buffer.capacity());

    pools.release(&first, &TextViewDefinition, reused);
    pools.release(&second, &TextViewDefinition, fresh);
    println!("Pools alive: {}", pools.pool_count());

    // Closing the first window throws away everything pooled for it.
    first_window.destroy();
    println!("Pools alive after closing first window: {}", pools.pool_count());

    let fresh_again = pools.acquire_or_create(&first, &TextViewDefinition);
    println!("Got {fresh_again:?} for the closed window.");
}
