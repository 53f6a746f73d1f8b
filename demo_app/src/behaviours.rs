//! Demo behaviour components
//!
//! - `Wanderer` alternates a character between two clips and walks it around
//! - `Spawner` emits short-lived entities under its owner
//! - `Lifetime` removes its entity once its time runs out

use scene_objects::prelude::*;

/// Switches between an idle and a walk clip on a timer
pub struct Wanderer {
    idle_clip: String,
    walk_clip: String,
    interval: f32,
    speed: f32,
    timer: f32,
    walking: Option<bool>,
}

/// Construction arguments for [`Wanderer`]
pub struct WandererArgs {
    /// Clip played while standing
    pub idle_clip: String,
    /// Clip played while moving
    pub walk_clip: String,
    /// Seconds between switches
    pub interval: f32,
    /// Units per second while walking
    pub speed: f32,
}

impl Wanderer {
    fn switch(&mut self, ctx: &mut FrameContext<'_>, walking: bool) -> SceneResult<()> {
        let clip = if walking { &self.walk_clip } else { &self.idle_clip };
        let owner = ctx.owner_name().to_owned();
        let Some(skin) = ctx.sibling_component_mut::<SkinInstance>() else {
            return Err(SceneError::Component {
                entity: owner,
                kind: Self::KIND,
                message: "requires a skin_instance component".into(),
            });
        };
        skin.set_animation(clip)?;
        log::debug!("'{}' now playing '{}'", owner, clip);
        self.walking = Some(walking);
        Ok(())
    }
}

impl Component for Wanderer {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        let walking = match self.walking {
            None => {
                self.switch(ctx, false)?;
                false
            }
            Some(walking) => walking,
        };

        self.timer += ctx.delta_time();
        if self.timer >= self.interval {
            self.timer -= self.interval;
            self.switch(ctx, !walking)?;
        }

        if self.walking == Some(true) {
            let step = self.speed * ctx.delta_time();
            let node = ctx.owner_node();
            if let Some(transform) = ctx.scene_mut().transform_mut(node) {
                transform.rotate_y(step * 0.5);
                let forward = transform.rotation * Vec3::z();
                transform.translate(forward * step);
            }
        }
        Ok(())
    }
}

impl ComponentType for Wanderer {
    const KIND: ComponentKind = ComponentKind::new("wanderer");
    type Args = WandererArgs;

    fn create(_attachment: &mut Attachment<'_>, args: WandererArgs) -> SceneResult<Self> {
        Ok(Self {
            idle_clip: args.idle_clip,
            walk_clip: args.walk_clip,
            interval: args.interval.max(f32::EPSILON),
            speed: args.speed,
            timer: 0.0,
            walking: None,
        })
    }
}

/// Emits [`Lifetime`] entities under its owner's node
pub struct Spawner {
    interval: f32,
    lifetime: f32,
    max_alive: usize,
    timer: f32,
    spawned: u64,
    alive: Vec<EntityId>,
}

impl Spawner {
    /// Total number of entities emitted so far
    pub fn spawned(&self) -> u64 {
        self.spawned
    }
}

impl Component for Spawner {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        self.alive
            .retain(|id| ctx.entity(*id).is_some() && !ctx.is_removal_pending(*id));

        self.timer += ctx.delta_time();
        while self.timer >= self.interval {
            self.timer -= self.interval;
            if self.alive.len() >= self.max_alive {
                continue;
            }

            self.spawned += 1;
            let name = format!("spark-{}", self.spawned);
            let parent = ctx.owner_node();
            let id = ctx.create_entity(parent, &name)?.id();
            ctx.add_component::<Lifetime>(id, self.lifetime)?;
            self.alive.push(id);
        }
        Ok(())
    }
}

impl ComponentType for Spawner {
    const KIND: ComponentKind = ComponentKind::new("spawner");
    type Args = (f32, f32, usize);

    fn create(_attachment: &mut Attachment<'_>, (interval, lifetime, max_alive): Self::Args) -> SceneResult<Self> {
        Ok(Self {
            interval: interval.max(f32::EPSILON),
            lifetime,
            max_alive,
            timer: 0.0,
            spawned: 0,
            alive: Vec::new(),
        })
    }
}

/// Rises for a while, then removes its entity
pub struct Lifetime {
    remaining: f32,
}

impl Component for Lifetime {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        let dt = ctx.delta_time();
        let node = ctx.owner_node();
        if let Some(transform) = ctx.scene_mut().transform_mut(node) {
            transform.translate(Vec3::new(0.0, dt, 0.0));
        }

        self.remaining -= dt;
        let owner = ctx.owner();
        if self.remaining <= 0.0 && !ctx.is_removal_pending(owner) {
            log::trace!("'{}' expired", ctx.owner_name());
            ctx.remove_entity(owner);
        }
        Ok(())
    }
}

impl ComponentType for Lifetime {
    const KIND: ComponentKind = ComponentKind::new("lifetime");
    type Args = f32;

    fn create(_attachment: &mut Attachment<'_>, remaining: f32) -> SceneResult<Self> {
        Ok(Self { remaining })
    }
}
