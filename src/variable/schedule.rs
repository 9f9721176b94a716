use std::rc::Rc;
use std::cmp::Ordering;
use std::collections::{ BinaryHeap, HashSet };

use crate::{
  scalar::Real,
  variable::FunctionNode,
};


/// Operation waiting for its gradients to be propagated.

struct Pending<T: Real> {
  func: Rc<FunctionNode<T>>,
  order: usize,
}

impl<T: Real> PartialEq for Pending<T> {
  fn eq(&self, rhs: &Self) -> bool {
    self.cmp(rhs) == Ordering::Equal
  }
}

impl<T: Real> Eq for Pending<T> {}

impl<T: Real> PartialOrd for Pending<T> {
  fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
    Some(self.cmp(rhs))
  }
}

impl<T: Real> Ord for Pending<T> {
  // Highest generation first, earliest enqueued among equals
  fn cmp(&self, rhs: &Self) -> Ordering {
    self.func.generation
      .cmp(&rhs.func.generation)
      .then_with(|| rhs.order.cmp(&self.order) )
  }
}


/// Order in which a backward pass visits recorded operations.
///
/// Operations pop in decreasing generation, so every consumer of a value has
/// contributed to its gradient before the value's own creator runs. Each
/// operation is visited at most once, no matter how many paths lead to it.

pub(crate) struct Schedule<T: Real> {
  queue: BinaryHeap<Pending<T>>,
  seen: HashSet<usize>,
  enqueued: usize,
}

impl<T: Real> Schedule<T> {
  pub fn new() -> Self {
    Self {
      queue: BinaryHeap::new(),
      seen: HashSet::new(),
      enqueued: 0,
    }
  }

  pub fn push(&mut self, func: &Rc<FunctionNode<T>>) {
    if !self.seen.insert(func.id) { return }
    self.queue.push(Pending { func: func.clone(), order: self.enqueued });
    self.enqueued += 1;
  }

  pub fn pop(&mut self) -> Option<Rc<FunctionNode<T>>> {
    self.queue.pop().map(|pending| pending.func )
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ Variable, ops };

  fn creator(var: &Variable<f64>) -> Rc<FunctionNode<f64>> {
    var.creator().unwrap()
  }

  #[test]
  fn pops_highest_generation_first() {
    let x = Variable::scalar(2.0);
    let a = ops::square(&x).unwrap();
    let b = ops::square(&a).unwrap();
    let c = ops::square(&b).unwrap();

    let mut schedule = Schedule::new();
    schedule.push(&creator(&a));
    schedule.push(&creator(&c));
    schedule.push(&creator(&b));

    assert_eq!(schedule.pop().unwrap().generation(), 2);
    assert_eq!(schedule.pop().unwrap().generation(), 1);
    assert_eq!(schedule.pop().unwrap().generation(), 0);
    assert!(schedule.pop().is_none());
  }

  #[test]
  fn enqueues_once() {
    let x = Variable::scalar(2.0);
    let a = ops::square(&x).unwrap();

    let mut schedule = Schedule::new();
    schedule.push(&creator(&a));
    schedule.push(&creator(&a));
    assert_eq!(schedule.len(), 1);
    schedule.pop();
    schedule.push(&creator(&a));
    assert_eq!(schedule.len(), 0);
  }

  #[test]
  fn ties_follow_enqueue_order() {
    let x = Variable::scalar(2.0);
    let a = ops::square(&x).unwrap();
    let b = ops::exp(&x).unwrap();
    let c = ops::neg(&x).unwrap();

    let mut schedule = Schedule::new();
    schedule.push(&creator(&b));
    schedule.push(&creator(&c));
    schedule.push(&creator(&a));

    let names: Vec<_> = std::iter::from_fn(|| schedule.pop() ).map(|f| f.name() ).collect();
    assert_eq!(names, vec!["exp", "neg", "square"]);
  }
}
