use divan::{Bencher, black_box};
use treecast::{Document, NodeId, Recorder};

fn main() {
    divan::main();
}

/// Detached `<list>` with `width` items, each holding a text node.
fn build_list(doc: &mut Document<treecast::Capture>, width: usize) -> NodeId {
    let list = doc.create_element("list");
    for i in 0..width {
        let item = doc.create_element("item");
        doc.set_property(item, "index", &i.to_string()).unwrap();
        let text = doc.create_text("label");
        doc.append_child(item, text).unwrap();
        doc.append_child(list, item).unwrap();
    }
    list
}

// Insert a populated subtree under an observed root: connect + serialize + dispatch
#[divan::bench(args = [10, 100, 1000])]
fn insert_subtree(bencher: Bencher, width: usize) {
    bencher
        .with_inputs(|| {
            let mut doc = Document::observed();
            let root = doc.create_root();
            doc.observe(root, Recorder::new()).unwrap();
            let list = build_list(&mut doc, width);
            (doc, root, list)
        })
        .bench_local_values(|(mut doc, root, list)| {
            doc.append_child(root, list).unwrap();
            black_box(doc);
        });
}

// Text updates on an already connected node
#[divan::bench]
fn set_text_connected(bencher: Bencher) {
    let mut doc = Document::observed();
    let root = doc.create_root();
    doc.observe(root, |batch: &[treecast::Mutation]| {
        black_box(batch);
    })
    .unwrap();
    let text = doc.create_text("");
    doc.append_child(root, text).unwrap();

    bencher.bench_local(|| {
        doc.set_text(black_box(text), "tick").unwrap();
    });
}
