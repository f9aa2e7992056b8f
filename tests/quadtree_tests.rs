use quadsweep::*;

fn world_with_index() -> PhysicsWorld {
    PhysicsWorld::new(PhysicsSettings {
        gravity: Vec2::ZERO,
        quadtree: Some(QuadTreeSettings {
            world_rect: Rect::from_xywh(0.0, 0.0, 100.0, 100.0),
            max_depth: 4,
        }),
        ..PhysicsSettings::default()
    })
    .unwrap()
}

#[test]
fn moving_body_changes_cell() {
    let mut world = world_with_index();
    let id = world.add_collider(Collider::builder().position(Vec2::new(3.0, 3.0)).build());
    world
        .push_rigidbody(id, Rigidbody::new().with_velocity(Vec2::new(500.0, 0.0)))
        .unwrap();

    let tree = world.index().unwrap();
    let before = tree.position(id).unwrap();
    assert_eq!(before.depth, 4);
    assert!(tree.items_at(&before).contains(&id));

    world.simulate_all(0.02);

    let tree = world.index().unwrap();
    let after = tree.position(id).unwrap();
    assert_ne!(after.node, before.node);
    assert_eq!(tree.last_position(id), Some(before));
    assert!(tree.items_at(&after).contains(&id));
    assert!(!tree.items_at(&before).contains(&id));
    assert!(tree.cell_rect(&after).unwrap().contains_point(Vec2::new(13.5, 3.5)));
}

#[test]
fn world_raycast_orders_hits() {
    let mut world = world_with_index();
    let mut ids = Vec::new();
    for x in [40.0, 10.0, 25.0] {
        let id = world.add_collider(
            Collider::builder()
                .position(Vec2::new(x, 50.0))
                .size(Vec2::new(2.0, 2.0))
                .build(),
        );
        world.push_platform(id, Platform::new()).unwrap();
        ids.push(id);
    }

    let hits = world.raycast(Vec2::new(0.0, 51.0), Vec2::X, 60.0, u32::MAX);
    let order: Vec<ColliderId> = hits.iter().map(|hit| hit.collider).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
    assert_eq!(hits[0].normal, Vec2::NEG_X);
    assert_eq!(hits[0].point, Vec2::new(10.0, 51.0));

    let short = world.raycast(Vec2::new(0.0, 51.0), Vec2::X, 20.0, u32::MAX);
    assert_eq!(short.len(), 1);
}

#[test]
fn hits_are_capped_per_ray() {
    let mut world = PhysicsWorld::new(PhysicsSettings {
        max_hits_per_ray: 3,
        ..PhysicsSettings::default()
    })
    .unwrap();
    for i in 0..8 {
        let id = world.add_collider(
            Collider::builder()
                .position(Vec2::new(5.0 + i as f32 * 2.0, 10.0))
                .build(),
        );
        world.push_platform(id, Platform::new()).unwrap();
    }

    let hits = world.raycast(Vec2::new(0.0, 10.5), Vec2::X, 90.0, u32::MAX);
    assert_eq!(hits.len(), 3);
    assert!(hits.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
}

#[test]
fn region_query_through_both_backends() {
    let mut indexed = world_with_index();
    let mut direct = PhysicsWorld::new(PhysicsSettings {
        query_backend: QueryBackend::Direct,
        ..PhysicsSettings::default()
    })
    .unwrap();

    for world in [&mut indexed, &mut direct] {
        for (x, y) in [(5.0, 5.0), (7.0, 5.0), (60.0, 60.0)] {
            let id = world.add_collider(Collider::builder().position(Vec2::new(x, y)).build());
            world.push_platform(id, Platform::new()).unwrap();
        }
    }

    let region = Rect::from_xywh(4.0, 4.0, 4.0, 2.0);
    let a = indexed.query_region(&region, u32::MAX);
    let b = direct.query_region(&region, u32::MAX);
    assert_eq!(a.len(), 2);
    assert_eq!(a, b);
}
